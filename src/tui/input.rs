use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Ticks between cursor blink phases (the runtime ticks every 100 ms).
const BLINK_TICKS: u8 = 5;

/// Single-line text editor with a character limit and an optional mask.
#[derive(Clone, Debug)]
pub struct TextInput {
    value: String,
    /// Cursor position in characters, `0..=len`.
    cursor: usize,
    char_limit: usize,
    placeholder: String,
    mask: Option<char>,
    focused: bool,
    cursor_visible: bool,
    blink: u8,
}

impl TextInput {
    pub fn new(placeholder: &str, char_limit: usize) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            char_limit,
            placeholder: placeholder.to_string(),
            mask: None,
            focused: false,
            cursor_visible: true,
            blink: 0,
        }
    }

    pub fn masked(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.chars().take(self.char_limit).collect();
        self.cursor = self.len();
    }

    pub fn focus(&mut self) {
        self.focused = true;
        self.cursor_visible = true;
        self.blink = 0;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn tick(&mut self) {
        if !self.focused {
            return;
        }
        self.blink += 1;
        if self.blink >= BLINK_TICKS {
            self.blink = 0;
            self.cursor_visible = !self.cursor_visible;
        }
    }

    /// Apply an editing key. Returns `false` for keys the editor ignores so
    /// the owner can interpret them.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if !self.focused {
            return false;
        }
        match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if self.len() < self.char_limit {
                    let at = self.byte_offset(self.cursor);
                    self.value.insert(at, ch);
                    self.cursor += 1;
                }
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let at = self.byte_offset(self.cursor - 1);
                    self.value.remove(at);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_offset(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => return false,
        }
        self.cursor_visible = true;
        self.blink = 0;
        true
    }

    /// The text as it may be shown on screen: masked inputs never reveal
    /// their contents, only one mask character per input character.
    pub fn display_value(&self) -> String {
        match self.mask {
            Some(mask) => std::iter::repeat(mask).take(self.len()).collect(),
            None => self.value.clone(),
        }
    }

    pub fn line(&self, prompt: &str, style: Style) -> Line<'static> {
        let mut spans = vec![Span::styled(prompt.to_string(), style)];
        if self.value.is_empty() && !self.focused {
            spans.push(Span::styled(
                self.placeholder.clone(),
                Style::default().fg(Color::DarkGray),
            ));
            return Line::from(spans);
        }

        let shown: Vec<char> = self.display_value().chars().collect();
        let before: String = shown[..self.cursor].iter().collect();
        spans.push(Span::styled(before, style));
        if self.focused {
            let under = shown.get(self.cursor).copied().unwrap_or(' ');
            let cursor_style = if self.cursor_visible {
                Style::default().fg(Color::Black).bg(Color::LightMagenta)
            } else {
                style
            };
            spans.push(Span::styled(under.to_string(), cursor_style));
            let after: String = shown.iter().skip(self.cursor + 1).collect();
            spans.push(Span::styled(after, style));
        } else {
            let after: String = shown[self.cursor..].iter().collect();
            spans.push(Span::styled(after, style));
        }
        Line::from(spans)
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}
