use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row as GridRow, Table};

use crate::tui::input::TextInput;
use crate::tui::layout::centered_columns;
use crate::tui::spinner::Spinner;

/// Terminal rows that never hold table rows: filter line, top and bottom
/// border, header, footer, help bar, error banner and one spare line.
pub const RESERVED_ROWS: u16 = 8;

const FILTER_CHAR_LIMIT: usize = 50;
const FILTER_WIDTH: u16 = 30;
const DEFAULT_TERMINAL_HEIGHT: u16 = 24;

const FOOTER_BG: Color = Color::Rgb(0x3c, 0x38, 0x36);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Display width in characters, padding included.
    pub width: u16,
}

impl Column {
    pub fn new(name: &str, width: u16) -> Self {
        Self {
            name: name.to_string(),
            width,
        }
    }
}

pub type Row = Vec<String>;

/// Requests the table hands back to its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableAction {
    FilterApplied(String),
    /// Carries the index of the page being left.
    NextPage(usize),
    /// Carries the index of the page being left.
    PrevPage(usize),
}

#[derive(Clone, Debug)]
struct Filter {
    input: TextInput,
    visible: bool,
    current: String,
}

#[derive(Clone, Debug, Default)]
struct Paging {
    /// Cursors used to reach the pages visited so far: `tokens[i]` fetched
    /// page `i + 1`, so the stack always holds `page` entries.
    tokens: Vec<String>,
    /// Cursor returned by the current page.
    next_token: Option<String>,
    page: usize,
    has_next: bool,
}

/// Scrollable grid with an optional inline filter and token-based paging.
#[derive(Debug)]
pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
    highlighted: usize,
    first_visible: usize,
    footer_info: String,
    loading: bool,
    spinner: Spinner,
    filter: Option<Filter>,
    paging: Paging,
    terminal_height: u16,
}

impl DataTable {
    pub fn new(columns: Vec<Column>, filtering: bool) -> Self {
        let filter = filtering.then(|| Filter {
            input: TextInput::new("filter", FILTER_CHAR_LIMIT),
            visible: false,
            current: String::new(),
        });
        Self {
            columns,
            rows: Vec::new(),
            highlighted: 0,
            first_visible: 0,
            footer_info: String::new(),
            loading: false,
            spinner: Spinner::default(),
            filter,
            paging: Paging::default(),
            terminal_height: DEFAULT_TERMINAL_HEIGHT,
        }
    }

    pub fn set_data(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.highlighted = 0;
        self.first_visible = 0;
        self.loading = false;
    }

    pub fn set_footer_info(&mut self, info: impl Into<String>) {
        self.footer_info = info.into();
    }

    pub fn set_has_next_page(&mut self, has_next: bool) {
        self.paging.has_next = has_next;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.highlighted)
    }

    pub fn highlighted_row(&self) -> Option<&Row> {
        self.rows.get(self.highlighted)
    }

    pub fn first_visible_row(&self) -> usize {
        self.first_visible
    }

    pub fn visible_row_count(&self) -> usize {
        let capacity = self.terminal_height.saturating_sub(RESERVED_ROWS).max(1) as usize;
        self.rows.len().min(capacity)
    }

    pub fn is_filter_visible(&self) -> bool {
        self.filter.as_ref().is_some_and(|f| f.visible)
    }

    pub fn current_filter(&self) -> &str {
        self.filter.as_ref().map(|f| f.current.as_str()).unwrap_or("")
    }

    /// Make `text` the committed filter and start paging over. Called once
    /// the listing requested by `FilterApplied` has arrived.
    pub fn commit_filter(&mut self, text: &str) {
        let Some(filter) = self.filter.as_mut() else {
            return;
        };
        filter.current = text.to_string();
        if !filter.visible {
            filter.input.set_value(text);
        }
        self.reset_paging();
    }

    pub fn current_page(&self) -> usize {
        self.paging.page
    }

    #[cfg(test)]
    pub fn continuation_tokens(&self) -> &[String] {
        &self.paging.tokens
    }

    /// The cursor captured after listing `page`, i.e. the one that fetches
    /// page `page + 1`.
    pub fn continuation_token(&self, page: usize) -> Option<&str> {
        if page == self.paging.page {
            self.paging.next_token.as_deref()
        } else {
            self.paging.tokens.get(page).map(String::as_str)
        }
    }

    /// Record a successful listing of `page` and the cursor it returned.
    /// Moving forward pushes the cursor that was used; moving back pops.
    pub fn record_page(&mut self, page: usize, next_token: Option<String>) {
        if page == self.paging.page + 1
            && let Some(cursor) = self.paging.next_token.take()
        {
            self.paging.tokens.push(cursor);
        }
        self.paging.tokens.truncate(page);
        self.paging.page = page;
        self.set_has_next_page(next_token.is_some());
        self.paging.next_token = next_token;
    }

    pub fn reset_paging(&mut self) {
        self.paging = Paging::default();
    }

    pub fn resize(&mut self, terminal_height: u16) {
        self.terminal_height = terminal_height;
        let visible = self.visible_row_count();
        if visible == 0 {
            self.first_visible = 0;
            return;
        }
        self.first_visible = self.first_visible.min(self.rows.len() - visible);
        if self.highlighted > self.first_visible + visible - 1 {
            self.first_visible = self.highlighted + 1 - visible;
        }
        if self.highlighted < self.first_visible {
            self.first_visible = self.highlighted;
        }
    }

    pub fn tick(&mut self) {
        if self.loading {
            self.spinner.tick();
        }
        if let Some(filter) = self.filter.as_mut().filter(|f| f.visible) {
            filter.input.tick();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<TableAction> {
        if self.is_filter_visible() {
            return self.handle_filter_key(key);
        }

        match key.code {
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Char('/') => {
                if let Some(filter) = self.filter.as_mut() {
                    let committed = filter.current.clone();
                    filter.input.set_value(&committed);
                    filter.input.focus();
                    filter.visible = true;
                }
            }
            KeyCode::Esc => {
                let filter = self.filter.as_mut()?;
                if filter.current.is_empty() {
                    return None;
                }
                self.loading = true;
                return Some(TableAction::FilterApplied(String::new()));
            }
            KeyCode::Right if self.paging.has_next => {
                self.loading = true;
                return Some(TableAction::NextPage(self.paging.page));
            }
            KeyCode::Left if self.paging.page > 0 => {
                self.loading = true;
                return Some(TableAction::PrevPage(self.paging.page));
            }
            _ => {}
        }
        None
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Option<TableAction> {
        let filter = self.filter.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                let committed = filter.current.clone();
                filter.input.set_value(&committed);
                filter.input.blur();
                filter.visible = false;
                None
            }
            KeyCode::Enter => {
                filter.input.blur();
                filter.visible = false;
                let requested = filter.input.value().to_string();
                self.loading = true;
                Some(TableAction::FilterApplied(requested))
            }
            _ => {
                filter.input.handle_key(key);
                None
            }
        }
    }

    fn move_up(&mut self) {
        if self.highlighted == 0 {
            return;
        }
        self.highlighted -= 1;
        if self.highlighted < self.first_visible {
            self.first_visible -= 1;
        }
    }

    fn move_down(&mut self) {
        if self.highlighted + 1 >= self.rows.len() {
            return;
        }
        self.highlighted += 1;
        if self.highlighted > self.first_visible + self.visible_row_count() - 1 {
            self.first_visible += 1;
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let table_width = self.columns.iter().map(|c| c.width).sum::<u16>() + 2;
        let area = centered_columns(table_width, area);
        let [filter_area, body_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

        if let Some(filter) = self.filter.as_ref().filter(|f| f.visible) {
            let input_area = Rect {
                width: FILTER_WIDTH.min(filter_area.width),
                ..filter_area
            };
            let prompt_style = Style::default().fg(Color::LightMagenta);
            frame.render_widget(
                Paragraph::new(filter.input.line("> ", prompt_style)),
                input_area,
            );
        }

        let visible = self.visible_row_count();
        let body_area = Rect {
            height: body_area.height.min(visible as u16 + 4),
            ..body_area
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(body_area);
        frame.render_widget(block, body_area);

        let [grid_area, footer_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);

        let header = GridRow::new(
            self.columns
                .iter()
                .enumerate()
                .map(|(idx, column)| Cell::from(pad_cell(idx, &column.name.to_uppercase()))),
        )
        .style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
        );

        let highlight = Style::default()
            .fg(Color::White)
            .bg(Color::Rgb(0x9a, 0x87, 0xa1));
        let rows = self
            .rows
            .iter()
            .enumerate()
            .skip(self.first_visible_row())
            .take(visible)
            .map(|(row_idx, row)| {
                let cells = self.columns.iter().enumerate().map(|(col_idx, column)| {
                    let value = row.get(col_idx).map(String::as_str).unwrap_or("");
                    Cell::from(pad_cell(col_idx, &display_cell(value, column.width)))
                });
                let grid_row = GridRow::new(cells);
                if row_idx == self.highlighted {
                    grid_row.style(highlight)
                } else {
                    grid_row
                }
            });

        let widths = self.columns.iter().map(|c| Constraint::Length(c.width));
        let grid = Table::new(rows, widths).header(header).column_spacing(0);
        frame.render_widget(grid, grid_area);

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(footer_area);
        let footer_style = Style::default().fg(Color::White).bg(FOOTER_BG);
        frame.render_widget(
            Paragraph::new(self.footer_left()).style(footer_style),
            left_area,
        );
        frame.render_widget(
            Paragraph::new(self.footer_right())
                .alignment(Alignment::Right)
                .style(footer_style),
            right_area,
        );
    }

    fn footer_left(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled(" .. ", badge(Color::Rgb(0xf2, 0x5d, 0x93))),
            Span::raw(format!(" {}", self.footer_info)),
        ])
    }

    fn footer_right(&self) -> Line<'static> {
        let mut spans = Vec::new();
        if self.loading {
            spans.push(Span::styled(
                format!(" {} loading ", self.spinner.frame()),
                badge(Color::Rgb(0xf2, 0x5d, 0x93)),
            ));
        }
        let filter = self.current_filter();
        if !filter.is_empty() {
            spans.push(Span::styled(
                format!(" ⌕ {filter} "),
                badge(Color::Rgb(0xfc, 0xa1, 0x7d)),
            ));
        }
        spans.push(Span::styled(
            format!(" {} ", self.paging_indicator()),
            badge(Color::Rgb(0x5c, 0xc1, 0xf7)),
        ));
        spans.push(Span::styled(
            format!(" {} ", self.nav_indicator()),
            badge(Color::Rgb(0xa5, 0x50, 0xdf)),
        ));
        spans.push(Span::styled(
            format!(" {} ", self.position()),
            badge(Color::Rgb(0x61, 0x24, 0xdf)),
        ));
        Line::from(spans)
    }

    fn paging_indicator(&self) -> String {
        let mut parts = vec!["pg".to_string(), (self.paging.page + 1).to_string()];
        if self.paging.page > 0 {
            parts.push("◀".into());
        }
        if self.paging.has_next {
            parts.push("▶".into());
        }
        parts.join(" ")
    }

    fn nav_indicator(&self) -> String {
        let up = if self.highlighted > 0 { "↑" } else { " " };
        let down = if self.highlighted + 1 < self.rows.len() {
            "↓"
        } else {
            " "
        };
        format!("{up} {down}")
    }

    fn position(&self) -> String {
        if self.rows.is_empty() {
            "0/0".to_string()
        } else {
            format!("{}/{}", self.highlighted + 1, self.rows.len())
        }
    }
}

fn badge(bg: Color) -> Style {
    Style::default().fg(Color::White).bg(bg)
}

fn pad_cell(col_idx: usize, text: &str) -> String {
    if col_idx == 0 {
        format!(" {text}")
    } else {
        text.to_string()
    }
}

/// The text shown for a cell: the last non-empty `/` segment, cut to
/// `width - 5` characters with a trailing `...`.
pub fn display_cell(value: &str, width: u16) -> String {
    let shown = value
        .split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or(value);

    let limit = width.saturating_sub(5) as usize;
    if limit > 0 && shown.chars().count() > limit {
        let cut: String = shown.chars().take(limit).collect();
        format!("{cut}...")
    } else {
        shown.to_string()
    }
}
