use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::tui::spinner::Spinner;

/// A `width` x `height` rectangle centered in `area`, clipped to it.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// A full-height strip of `width` columns centered horizontally in `area`.
pub fn centered_columns(width: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}

/// Clear `area`, paint it black and drop a one-cell shadow below and to
/// the right of it, clipped to the frame.
pub fn draw_modal_surface(frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);

    let canvas = frame.size();
    let below = Rect::new(area.x + 1, area.bottom(), area.width, 1);
    let beside = Rect::new(area.right(), area.y + 1, 1, area.height);
    for shadow in [below, beside] {
        let visible = shadow.intersection(canvas);
        if !visible.is_empty() {
            frame.render_widget(
                Block::default().style(Style::default().bg(Color::DarkGray)),
                visible,
            );
        }
    }
}

pub fn dialog_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(0x87, 0x4b, 0xfd)))
        .style(Style::default().bg(Color::Black))
}

pub fn draw_loading_dialog(frame: &mut Frame, area: Rect, message: &str, spinner: &Spinner) {
    let width = (message.chars().count() as u16).saturating_add(8);
    let dialog = centered_rect(width, 5, area);
    draw_modal_surface(frame, dialog);
    let line = Line::from(vec![
        Span::styled(
            format!("{} ", spinner.frame()),
            Style::default().fg(Color::LightMagenta),
        ),
        Span::raw(message.to_string()),
    ]);
    let para = Paragraph::new(vec![Line::from(""), line])
        .alignment(Alignment::Center)
        .block(dialog_block());
    frame.render_widget(para, dialog);
}

pub fn draw_error_banner(frame: &mut Frame, area: Rect, message: &str) {
    let style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
    let para = Paragraph::new(Line::from(Span::styled(format!("✗ {message}"), style)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(para, area);
}

/// Key/description pairs rendered as `key desc • key desc`.
pub fn help_line(items: &[(&str, &str)]) -> Line<'static> {
    let key_style = Style::default().fg(Color::Gray);
    let desc_style = Style::default().fg(Color::DarkGray);
    let mut spans = Vec::new();
    for (idx, (key, desc)) in items.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" • ", desc_style));
        }
        spans.push(Span::styled(key.to_string(), key_style));
        spans.push(Span::styled(format!(" {desc}"), desc_style));
    }
    Line::from(spans)
}

pub fn draw_help(frame: &mut Frame, area: Rect, items: &[(&str, &str)]) {
    let para = Paragraph::new(help_line(items)).alignment(Alignment::Center);
    frame.render_widget(para, area);
}

pub fn format_size(size: i64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    if size < 1024 {
        return format!("{size} B");
    }
    let mut value = size as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
