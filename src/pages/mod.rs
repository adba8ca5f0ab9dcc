pub mod buckets;
pub mod credentials;
pub mod objects;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{Command, Event, NavState};

/// A full-screen page driven by the navigator.
pub trait Screen {
    /// Reset the page for a fresh visit and return its initial work.
    fn init(&mut self, nav: &NavState) -> Vec<Command>;

    fn update(&mut self, nav: &mut NavState, event: Event) -> Vec<Command>;

    fn render(&self, frame: &mut Frame, area: Rect, nav: &NavState);
}
