use throbber_widgets_tui::symbols::throbber::BRAILLE_EIGHT;
use throbber_widgets_tui::{Throbber, ThrobberState};

/// Loading indicator; advances one frame per tick.
#[derive(Debug, Default)]
pub struct Spinner {
    state: ThrobberState,
}

impl Spinner {
    pub fn tick(&mut self) {
        self.state.calc_next();
    }

    pub fn frame(&self) -> String {
        Throbber::default()
            .throbber_set(BRAILLE_EIGHT)
            .to_symbol_span(&self.state)
            .content
            .trim()
            .to_string()
    }
}
