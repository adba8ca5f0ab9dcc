use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use tracing::{debug, info};

use crate::aws::Session;
use crate::error::GatewayError;
use crate::models::{BucketInfo, ObjectListing, ObjectQuery};
use crate::pages::Screen;
use crate::pages::buckets::BucketsPage;
use crate::pages::credentials::CredentialsPage;
use crate::pages::objects::ObjectsPage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Credentials,
    Buckets,
    Objects,
}

/// Where the user is. Controllers read it; only the navigator and the
/// objects page (for the current path) write it.
#[derive(Clone, Debug)]
pub struct NavState {
    pub page: Page,
    pub session: Option<Session>,
    pub bucket: Option<String>,
    /// Current prefix inside `bucket`; empty at the bucket root.
    pub path: String,
    pub terminal_height: u16,
}

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
    BucketsLoaded(Result<Vec<BucketInfo>, GatewayError>),
    ObjectsLoaded {
        query: ObjectQuery,
        result: Result<ObjectListing, GatewayError>,
    },
    CredentialsValidated(Result<Session, GatewayError>),
}

/// Asynchronous work requested by a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    ListBuckets,
    ListObjects(ObjectQuery),
    ValidateCredentials {
        access_key: String,
        secret_key: String,
    },
}

#[derive(Clone, Debug)]
pub enum PageChange {
    /// `session` replaces the stored session when present.
    Buckets { session: Option<Session> },
    Objects { bucket: String },
}

#[derive(Clone, Debug)]
pub enum Command {
    Spawn(Task),
    Navigate(PageChange),
}

pub struct Navigator {
    nav: NavState,
    credentials: CredentialsPage,
    buckets: BucketsPage,
    objects: ObjectsPage,
    should_quit: bool,
}

impl Navigator {
    /// Starts on the bucket list when a session is already available and on
    /// the credentials form otherwise.
    pub fn new(session: Option<Session>, terminal_height: u16) -> Self {
        let page = if session.is_some() {
            Page::Buckets
        } else {
            Page::Credentials
        };
        Self {
            nav: NavState {
                page,
                session,
                bucket: None,
                path: String::new(),
                terminal_height,
            },
            credentials: CredentialsPage::new(),
            buckets: BucketsPage::new(),
            objects: ObjectsPage::new(),
            should_quit: false,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.nav
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Initialise the first page and return the work it asked for.
    pub fn start(&mut self) -> Vec<Task> {
        info!(page = ?self.nav.page, "starting");
        let commands = self.init_active();
        self.apply(commands)
    }

    pub fn handle(&mut self, event: Event) -> Vec<Task> {
        if let Event::Key(key) = &event
            && key.code == KeyCode::Char('c')
            && key.modifiers.contains(KeyModifiers::CONTROL)
        {
            self.should_quit = true;
            return Vec::new();
        }
        if let Event::Resize(width, height) = event {
            debug!(width, height, "terminal resized");
            self.nav.terminal_height = height;
        }

        let nav = &mut self.nav;
        let commands = match nav.page {
            Page::Credentials => self.credentials.update(nav, event),
            Page::Buckets => self.buckets.update(nav, event),
            Page::Objects => self.objects.update(nav, event),
        };
        self.apply(commands)
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.size();
        match self.nav.page {
            Page::Credentials => self.credentials.render(frame, area, &self.nav),
            Page::Buckets => self.buckets.render(frame, area, &self.nav),
            Page::Objects => self.objects.render(frame, area, &self.nav),
        }
    }

    fn apply(&mut self, commands: Vec<Command>) -> Vec<Task> {
        let mut pending: VecDeque<Command> = commands.into();
        let mut tasks = Vec::new();
        while let Some(command) = pending.pop_front() {
            match command {
                Command::Spawn(task) => {
                    debug!(?task, "task requested");
                    tasks.push(task);
                }
                Command::Navigate(change) => pending.extend(self.navigate(change)),
            }
        }
        tasks
    }

    fn navigate(&mut self, change: PageChange) -> Vec<Command> {
        match change {
            PageChange::Buckets { session } => {
                if session.is_some() {
                    self.nav.session = session;
                }
                self.nav.page = Page::Buckets;
                self.nav.bucket = None;
            }
            PageChange::Objects { bucket } => {
                self.nav.page = Page::Objects;
                self.nav.bucket = Some(bucket);
            }
        }
        self.nav.path.clear();
        info!(
            page = ?self.nav.page,
            bucket = self.nav.bucket.as_deref().unwrap_or(""),
            "page changed"
        );
        self.init_active()
    }

    fn init_active(&mut self) -> Vec<Command> {
        let nav = &self.nav;
        match nav.page {
            Page::Credentials => self.credentials.init(nav),
            Page::Buckets => self.buckets.init(nav),
            Page::Objects => self.objects.init(nav),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn bucket(name: &str) -> BucketInfo {
        BucketInfo {
            name: name.to_string(),
            creation_date: None,
        }
    }

    fn signed_in() -> Navigator {
        let mut navigator = Navigator::new(Some(Session::offline()), 30);
        assert_eq!(navigator.start(), vec![Task::ListBuckets]);
        navigator
    }

    #[test]
    fn starts_on_credentials_without_a_session() {
        let mut navigator = Navigator::new(None, 30);
        assert_eq!(navigator.state().page, Page::Credentials);
        assert!(navigator.start().is_empty());
    }

    #[test]
    fn ctrl_c_quits_from_any_page() {
        let mut navigator = signed_in();
        let tasks = navigator.handle(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(tasks.is_empty());
        assert!(navigator.should_quit());
    }

    #[test]
    fn plain_c_does_not_quit() {
        let mut navigator = signed_in();
        navigator.handle(key(KeyCode::Char('c')));
        assert!(!navigator.should_quit());
    }

    #[test]
    fn selecting_a_bucket_opens_its_root() {
        let mut navigator = signed_in();
        navigator.handle(Event::BucketsLoaded(Ok(vec![bucket("alpha"), bucket("beta")])));
        navigator.handle(key(KeyCode::Down));
        let tasks = navigator.handle(key(KeyCode::Enter));

        assert_eq!(navigator.state().page, Page::Objects);
        assert_eq!(navigator.state().bucket.as_deref(), Some("beta"));
        assert_eq!(navigator.state().path, "");
        assert_eq!(
            tasks,
            vec![Task::ListObjects(ObjectQuery::first_page("beta", "", ""))]
        );
    }

    #[test]
    fn escape_at_bucket_root_returns_to_bucket_list() {
        let mut navigator = signed_in();
        navigator.handle(Event::BucketsLoaded(Ok(vec![bucket("alpha")])));
        navigator.handle(key(KeyCode::Enter));
        navigator.handle(Event::ObjectsLoaded {
            query: ObjectQuery::first_page("alpha", "", ""),
            result: Ok(ObjectListing::default()),
        });

        let tasks = navigator.handle(key(KeyCode::Esc));
        assert_eq!(navigator.state().page, Page::Buckets);
        assert_eq!(navigator.state().bucket, None);
        assert!(navigator.state().session.is_some());
        assert_eq!(tasks, vec![Task::ListBuckets]);
    }

    #[test]
    fn validated_credentials_store_the_session() {
        let mut navigator = Navigator::new(None, 30);
        navigator.start();

        let tasks = navigator.handle(Event::CredentialsValidated(Ok(Session::offline())));
        assert_eq!(navigator.state().page, Page::Buckets);
        assert!(navigator.state().session.is_some());
        assert_eq!(tasks, vec![Task::ListBuckets]);
    }

    #[test]
    fn resize_updates_terminal_height() {
        let mut navigator = signed_in();
        navigator.handle(Event::Resize(120, 50));
        assert_eq!(navigator.state().terminal_height, 50);
    }
}
