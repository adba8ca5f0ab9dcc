use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use tracing::warn;

use crate::app::{Command, Event, NavState, PageChange, Task};
use crate::error::GatewayError;
use crate::models::{BucketInfo, format_timestamp};
use crate::pages::Screen;
use crate::tui::layout::{draw_error_banner, draw_help, draw_loading_dialog};
use crate::tui::spinner::Spinner;
use crate::tui::table::{Column, DataTable, Row};

const HELP: &[(&str, &str)] = &[
    ("↑/↓", "move"),
    ("enter", "open"),
    ("f", "refresh"),
    ("ctrl+c", "quit"),
];

fn columns() -> Vec<Column> {
    vec![Column::new("Name", 45), Column::new("Created", 28)]
}

pub struct BucketsPage {
    table: DataTable,
    loaded: bool,
    spinner: Spinner,
    error: Option<String>,
}

impl BucketsPage {
    pub fn new() -> Self {
        Self {
            table: DataTable::new(columns(), false),
            loaded: false,
            spinner: Spinner::default(),
            error: None,
        }
    }

    fn refresh(&mut self) -> Vec<Command> {
        self.table.set_loading(true);
        vec![Command::Spawn(Task::ListBuckets)]
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Enter => match self.table.highlighted_row() {
                Some(row) => vec![Command::Navigate(PageChange::Objects {
                    bucket: row[0].clone(),
                })],
                None => Vec::new(),
            },
            KeyCode::Char('f') if !self.table.is_loading() => self.refresh(),
            _ => {
                self.table.handle_key(key);
                Vec::new()
            }
        }
    }

    fn apply_listing(&mut self, result: Result<Vec<BucketInfo>, GatewayError>) {
        self.loaded = true;
        match result {
            Ok(buckets) => {
                let rows: Vec<Row> = buckets
                    .iter()
                    .map(|bucket| {
                        vec![
                            bucket.name.clone(),
                            format_timestamp(bucket.creation_date.as_ref()),
                        ]
                    })
                    .collect();
                self.table.set_footer_info(format!("{} buckets", rows.len()));
                self.table.set_data(rows);
                self.error = None;
            }
            Err(err) => {
                warn!(error = %err, "bucket listing failed");
                self.table.set_loading(false);
                self.error = Some(err.to_string());
            }
        }
    }
}

impl Default for BucketsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for BucketsPage {
    fn init(&mut self, nav: &NavState) -> Vec<Command> {
        *self = Self::new();
        self.table.resize(nav.terminal_height);
        self.refresh()
    }

    fn update(&mut self, nav: &mut NavState, event: Event) -> Vec<Command> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Tick => {
                self.spinner.tick();
                self.table.tick();
                Vec::new()
            }
            Event::Resize(..) => {
                self.table.resize(nav.terminal_height);
                Vec::new()
            }
            Event::BucketsLoaded(result) => {
                self.apply_listing(result);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _nav: &NavState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.table.render(frame, chunks[0]);
        if let Some(error) = &self.error {
            draw_error_banner(frame, chunks[1], error);
        }
        draw_help(frame, chunks[2], HELP);

        if !self.loaded {
            draw_loading_dialog(frame, area, "Loading buckets", &self.spinner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Page;
    use crate::aws::Session;
    use chrono::{TimeZone, Utc};
    use crossterm::event::KeyModifiers;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn nav() -> NavState {
        NavState {
            page: Page::Buckets,
            session: Some(Session::offline()),
            bucket: None,
            path: String::new(),
            terminal_height: 30,
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn loaded_page(names: &[&str]) -> (BucketsPage, NavState) {
        let mut nav = nav();
        let mut page = BucketsPage::new();
        page.init(&nav);
        let buckets = names
            .iter()
            .map(|name| BucketInfo {
                name: name.to_string(),
                creation_date: None,
            })
            .collect();
        page.update(&mut nav, Event::BucketsLoaded(Ok(buckets)));
        (page, nav)
    }

    fn screen_text(page: &BucketsPage, nav: &NavState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| page.render(frame, frame.size(), nav))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn init_requests_the_bucket_list() {
        let mut page = BucketsPage::new();
        let commands = page.init(&nav());
        assert!(matches!(
            commands.as_slice(),
            [Command::Spawn(Task::ListBuckets)]
        ));
        assert!(page.table.is_loading());
    }

    #[test]
    fn buckets_become_name_and_creation_rows() {
        let mut nav = nav();
        let mut page = BucketsPage::new();
        page.init(&nav);
        let created = Utc.with_ymd_and_hms(2021, 3, 14, 15, 9, 26).unwrap();
        page.update(
            &mut nav,
            Event::BucketsLoaded(Ok(vec![
                BucketInfo {
                    name: "logs".into(),
                    creation_date: Some(created),
                },
                BucketInfo {
                    name: "media".into(),
                    creation_date: None,
                },
            ])),
        );

        assert_eq!(
            page.table.rows(),
            [
                vec!["logs".to_string(), "2021-03-14 15:09:26 UTC".to_string()],
                vec!["media".to_string(), String::new()],
            ]
        );
        assert!(!page.table.is_loading());
    }

    #[test]
    fn enter_opens_the_highlighted_bucket() {
        let (mut page, mut nav) = loaded_page(&["logs", "media"]);
        page.update(&mut nav, key(KeyCode::Down));
        let commands = page.update(&mut nav, key(KeyCode::Enter));
        assert!(matches!(
            commands.as_slice(),
            [Command::Navigate(PageChange::Objects { bucket })] if bucket == "media"
        ));
    }

    #[test]
    fn enter_on_an_empty_list_does_nothing() {
        let (mut page, mut nav) = loaded_page(&[]);
        assert!(page.update(&mut nav, key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn f_refreshes_once_per_load() {
        let (mut page, mut nav) = loaded_page(&["logs"]);
        let commands = page.update(&mut nav, key(KeyCode::Char('f')));
        assert!(matches!(
            commands.as_slice(),
            [Command::Spawn(Task::ListBuckets)]
        ));
        assert!(page.update(&mut nav, key(KeyCode::Char('f'))).is_empty());
    }

    #[test]
    fn listing_failure_keeps_rows_and_shows_banner() {
        let (mut page, mut nav) = loaded_page(&["logs"]);
        page.update(&mut nav, key(KeyCode::Char('f')));
        page.update(
            &mut nav,
            Event::BucketsLoaded(Err(GatewayError::service("ListBuckets", "AccessDenied"))),
        );

        assert_eq!(page.table.rows().len(), 1);
        assert!(!page.table.is_loading());
        let text = screen_text(&page, &nav);
        assert!(text.contains("✗ ListBuckets failed: AccessDenied"));
    }

    #[test]
    fn loading_dialog_shows_until_first_result() {
        let mut nav = nav();
        let mut page = BucketsPage::new();
        page.init(&nav);
        assert!(screen_text(&page, &nav).contains("Loading buckets"));

        page.update(&mut nav, Event::BucketsLoaded(Ok(Vec::new())));
        assert!(!screen_text(&page, &nav).contains("Loading buckets"));
    }
}
