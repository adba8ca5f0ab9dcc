use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::{info, warn};

use crate::app::{Command, Event, NavState, PageChange, Task};
use crate::error::GatewayError;
use crate::pages::Screen;
use crate::tui::input::TextInput;
use crate::tui::layout::{centered_rect, dialog_block, draw_help, draw_modal_surface};
use crate::tui::spinner::Spinner;

const INPUT_LIMIT: usize = 50;
const SECRET_MASK: char = '•';
const FOCUS_STOPS: usize = 3;
const SUBMIT: usize = 2;

const HELP: &[(&str, &str)] = &[
    ("tab", "next field"),
    ("shift+tab", "previous"),
    ("enter", "submit"),
    ("ctrl+c", "quit"),
];

pub struct CredentialsPage {
    access_key: TextInput,
    secret_key: TextInput,
    focus: usize,
    validating: bool,
    spinner: Spinner,
    error: Option<String>,
}

impl CredentialsPage {
    pub fn new() -> Self {
        let mut page = Self {
            access_key: TextInput::new("Access Key ID", INPUT_LIMIT),
            secret_key: TextInput::new("Secret Access Key", INPUT_LIMIT).masked(SECRET_MASK),
            focus: 0,
            validating: false,
            spinner: Spinner::default(),
            error: None,
        };
        page.set_focus(0);
        page
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus % FOCUS_STOPS;
        self.access_key.blur();
        self.secret_key.blur();
        match self.focus {
            0 => self.access_key.focus(),
            1 => self.secret_key.focus(),
            _ => {}
        }
    }

    fn submit(&mut self) -> Vec<Command> {
        let access_key = self.access_key.value().trim();
        let secret_key = self.secret_key.value().trim();
        if access_key.is_empty() || secret_key.is_empty() {
            self.error = Some(GatewayError::EmptyCredentials.to_string());
            return Vec::new();
        }
        let task = Task::ValidateCredentials {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        };
        info!("validating credentials");
        self.validating = true;
        self.error = None;
        vec![Command::Spawn(task)]
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if self.validating {
            return Vec::new();
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.set_focus(self.focus + 1),
            KeyCode::BackTab | KeyCode::Up => self.set_focus(self.focus + FOCUS_STOPS - 1),
            KeyCode::Enter if self.focus == SUBMIT => return self.submit(),
            KeyCode::Enter => self.set_focus(self.focus + 1),
            _ => {
                match self.focus {
                    0 => self.access_key.handle_key(key),
                    1 => self.secret_key.handle_key(key),
                    _ => false,
                };
            }
        }
        Vec::new()
    }

    fn status_line(&self) -> Line<'static> {
        if self.validating {
            return Line::from(vec![
                Span::styled(
                    format!("{} ", self.spinner.frame()),
                    Style::default().fg(Color::LightMagenta),
                ),
                Span::raw("Validating..."),
            ]);
        }
        match &self.error {
            Some(error) => Line::from(Span::styled(
                format!("✗ {error}"),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(""),
        }
    }

    fn submit_line(&self) -> Line<'static> {
        let style = if self.focus == SUBMIT {
            Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0xf2, 0x5d, 0x93))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(Span::styled(" Submit ", style))
    }
}

impl Default for CredentialsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for CredentialsPage {
    fn init(&mut self, _nav: &NavState) -> Vec<Command> {
        *self = Self::new();
        Vec::new()
    }

    fn update(&mut self, _nav: &mut NavState, event: Event) -> Vec<Command> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Tick => {
                if self.validating {
                    self.spinner.tick();
                }
                self.access_key.tick();
                self.secret_key.tick();
                Vec::new()
            }
            Event::CredentialsValidated(Ok(session)) => {
                self.validating = false;
                info!(region = session.region(), "credentials accepted");
                vec![Command::Navigate(PageChange::Buckets {
                    session: Some(session),
                })]
            }
            Event::CredentialsValidated(Err(err)) => {
                warn!(error = %err, "credentials rejected");
                self.validating = false;
                self.error = Some(err.to_string());
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _nav: &NavState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let dialog = centered_rect(64, 13, chunks[0]);
        draw_modal_surface(frame, dialog);

        let focused = Style::default().fg(Color::LightMagenta);
        let idle = Style::default().fg(Color::Gray);
        let prompt = |input: &TextInput| if input.is_focused() { focused } else { idle };

        let lines = vec![
            Line::from(Span::styled(
                "No AWS credentials were found. Enter a key pair to continue.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from("Access Key ID"),
            self.access_key.line("> ", prompt(&self.access_key)),
            Line::from(""),
            Line::from("Secret Access Key"),
            self.secret_key.line("> ", prompt(&self.secret_key)),
            Line::from(""),
            self.submit_line(),
            Line::from(""),
            self.status_line(),
        ];
        let form = Paragraph::new(lines)
            .block(dialog_block().title(" AWS credentials "))
            .alignment(Alignment::Left);
        frame.render_widget(form, dialog);

        draw_help(frame, chunks[1], HELP);
    }
}
