use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use tracing::{debug, warn};

use crate::app::{Command, Event, NavState, PageChange, Task};
use crate::error::GatewayError;
use crate::models::{ObjectListing, ObjectQuery, format_timestamp};
use crate::pages::Screen;
use crate::tui::layout::{draw_error_banner, draw_help, format_size};
use crate::tui::table::{Column, DataTable, Row, TableAction};

const DIRECTORY_MARKER: &str = "▸";

const HELP: &[(&str, &str)] = &[
    ("↑/↓", "move"),
    ("enter", "open dir"),
    ("esc", "back"),
    ("←/→", "page"),
    ("/", "filter"),
    ("f", "refresh"),
    ("ctrl+c", "quit"),
];

const FILTER_HELP: &[(&str, &str)] = &[("enter", "apply filter"), ("esc", "cancel")];

fn columns() -> Vec<Column> {
    vec![
        Column::new("", 3),
        Column::new("Key", 45),
        Column::new("Size", 12),
        Column::new("Last Modified", 26),
        Column::new("Owner", 20),
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Entry {
    Directory(String),
    File,
}

pub struct ObjectsPage {
    table: DataTable,
    entries: Vec<Entry>,
    /// The most recent listing request; older responses are stale.
    pending: Option<ObjectQuery>,
    error: Option<String>,
}

impl ObjectsPage {
    pub fn new() -> Self {
        Self {
            table: DataTable::new(columns(), true),
            entries: Vec::new(),
            pending: None,
            error: None,
        }
    }

    fn load(&mut self, query: ObjectQuery) -> Vec<Command> {
        debug!(
            bucket = %query.bucket,
            path = %query.path,
            filter = %query.filter,
            page = query.page,
            "listing objects"
        );
        self.table.set_loading(true);
        self.pending = Some(query.clone());
        vec![Command::Spawn(Task::ListObjects(query))]
    }

    /// A query for `page` of the current location, using the cursor
    /// captured after the page before it.
    fn page_query(&self, bucket: &str, path: &str, page: usize) -> ObjectQuery {
        let continuation_token = page
            .checked_sub(1)
            .and_then(|previous| self.table.continuation_token(previous))
            .map(str::to_string);
        ObjectQuery {
            bucket: bucket.to_string(),
            path: path.to_string(),
            filter: self.table.current_filter().to_string(),
            continuation_token,
            page,
        }
    }

    fn handle_key(&mut self, nav: &NavState, key: KeyEvent) -> Vec<Command> {
        let Some(bucket) = nav.bucket.clone() else {
            return Vec::new();
        };

        if !self.table.is_filter_visible() {
            let busy = self.table.is_loading();
            match key.code {
                KeyCode::Enter if !busy => return self.open_highlighted(&bucket),
                KeyCode::Esc if !busy && self.table.current_filter().is_empty() => {
                    return self.go_up(&bucket, &nav.path);
                }
                KeyCode::Char('f') if !busy => {
                    let query = self.page_query(&bucket, &nav.path, self.table.current_page());
                    return self.load(query);
                }
                KeyCode::Enter | KeyCode::Esc | KeyCode::Left | KeyCode::Right if busy => {
                    return Vec::new();
                }
                _ => {}
            }
        }

        match self.table.handle_key(key) {
            Some(TableAction::FilterApplied(filter)) => {
                self.load(ObjectQuery::first_page(&bucket, &nav.path, &filter))
            }
            Some(TableAction::NextPage(page)) => {
                let query = self.page_query(&bucket, &nav.path, page + 1);
                self.load(query)
            }
            Some(TableAction::PrevPage(page)) => {
                let query = self.page_query(&bucket, &nav.path, page.saturating_sub(1));
                self.load(query)
            }
            None => Vec::new(),
        }
    }

    fn open_highlighted(&mut self, bucket: &str) -> Vec<Command> {
        let Some(index) = self.table.highlighted_index() else {
            return Vec::new();
        };
        match self.entries.get(index) {
            Some(Entry::Directory(prefix)) => {
                let query = ObjectQuery::first_page(bucket, prefix, "");
                self.load(query)
            }
            _ => Vec::new(),
        }
    }

    fn go_up(&mut self, bucket: &str, path: &str) -> Vec<Command> {
        if path.is_empty() {
            return vec![Command::Navigate(PageChange::Buckets { session: None })];
        }
        self.load(ObjectQuery::first_page(bucket, parent_prefix(path), ""))
    }

    fn apply_listing(
        &mut self,
        nav: &mut NavState,
        query: ObjectQuery,
        result: Result<ObjectListing, GatewayError>,
    ) {
        if nav.bucket.as_deref() != Some(query.bucket.as_str()) {
            debug!(bucket = %query.bucket, "dropping listing for another bucket");
            return;
        }
        if self.pending.as_ref() != Some(&query) {
            debug!(path = %query.path, page = query.page, "dropping superseded listing");
            return;
        }
        self.pending = None;

        let listing = match result {
            Ok(listing) => listing,
            Err(err) => {
                warn!(
                    error = %err,
                    bucket = %query.bucket,
                    path = %query.path,
                    "object listing failed"
                );
                self.table.set_loading(false);
                self.error = Some(err.to_string());
                return;
            }
        };

        let count = listing.directories.len() + listing.files.len();
        let mut rows: Vec<Row> = Vec::with_capacity(count);
        let mut entries = Vec::with_capacity(count);
        for prefix in &listing.directories {
            rows.push(vec![
                DIRECTORY_MARKER.to_string(),
                prefix.clone(),
                String::new(),
                String::new(),
                String::new(),
            ]);
            entries.push(Entry::Directory(prefix.clone()));
        }
        for file in &listing.files {
            rows.push(vec![
                " ".to_string(),
                file.key.clone(),
                format_size(file.size),
                format_timestamp(file.last_modified.as_ref()),
                file.owner.clone().unwrap_or_default(),
            ]);
            entries.push(Entry::File);
        }

        if query.filter != self.table.current_filter() {
            self.table.commit_filter(&query.filter);
        }
        self.entries = entries;
        self.table.set_data(rows);
        self.table.record_page(query.page, listing.next_token);
        self.table.set_footer_info(format!("{}/{}", query.bucket, query.path));
        self.error = None;
        nav.path = query.path;
    }
}

impl Default for ObjectsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for ObjectsPage {
    fn init(&mut self, nav: &NavState) -> Vec<Command> {
        *self = Self::new();
        self.table.resize(nav.terminal_height);
        let Some(bucket) = nav.bucket.as_deref() else {
            return Vec::new();
        };
        self.table.set_footer_info(format!("{bucket}/"));
        self.load(ObjectQuery::first_page(bucket, "", ""))
    }

    fn update(&mut self, nav: &mut NavState, event: Event) -> Vec<Command> {
        match event {
            Event::Key(key) => self.handle_key(nav, key),
            Event::Tick => {
                self.table.tick();
                Vec::new()
            }
            Event::Resize(..) => {
                self.table.resize(nav.terminal_height);
                Vec::new()
            }
            Event::ObjectsLoaded { query, result } => {
                self.apply_listing(nav, query, result);
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
        let help = if self.table.is_filter_visible() {
            FILTER_HELP
        } else {
            HELP
        };
        draw_help(frame, chunks[2], help);
    }
}

/// The prefix one level above `path`: `"a/b/"` gives `"a/"`, `"a/"` gives
/// `""`.
pub fn parent_prefix(path: &str) -> &str {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}
