pub mod input;
pub mod layout;
pub mod spinner;
pub mod table;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event as TerminalEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use crate::app::{Event, Navigator, Task};
use crate::aws::{Session, StorageGateway};
use crate::error::GatewayError;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub async fn run(session: Option<Session>, gateway: Arc<dyn StorageGateway>) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = event_loop(&mut terminal, session, gateway).await;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: Option<Session>,
    gateway: Arc<dyn StorageGateway>,
) -> Result<()> {
    let height = terminal.size()?.height;
    let mut navigator = Navigator::new(session, height);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let tasks = navigator.start();
    dispatch(&navigator, tasks, &gateway, &tx);

    loop {
        terminal.draw(|frame| navigator.render(frame))?;

        while event::poll(Duration::ZERO)? {
            if let Some(event) = translate(event::read()?) {
                let tasks = navigator.handle(event);
                dispatch(&navigator, tasks, &gateway, &tx);
            }
        }
        if navigator.should_quit() {
            break;
        }

        let event = tokio::select! {
            Some(event) = rx.recv() => event,
            _ = tokio::time::sleep(TICK_INTERVAL) => Event::Tick,
        };
        let tasks = navigator.handle(event);
        dispatch(&navigator, tasks, &gateway, &tx);

        if navigator.should_quit() {
            break;
        }
    }

    info!("quitting");
    Ok(())
}

fn translate(event: TerminalEvent) -> Option<Event> {
    match event {
        TerminalEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        TerminalEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

fn dispatch(
    navigator: &Navigator,
    tasks: Vec<Task>,
    gateway: &Arc<dyn StorageGateway>,
    tx: &UnboundedSender<Event>,
) {
    for task in tasks {
        spawn_task(
            task,
            navigator.state().session.clone(),
            Arc::clone(gateway),
            tx.clone(),
        );
    }
}

/// Run `task` in the background; its result comes back through `tx`.
fn spawn_task(
    task: Task,
    session: Option<Session>,
    gateway: Arc<dyn StorageGateway>,
    tx: UnboundedSender<Event>,
) {
    tokio::spawn(async move {
        let event = execute(task, session.as_ref(), gateway.as_ref()).await;
        if tx.send(event).is_err() {
            debug!("event loop closed before task completed");
        }
    });
}

pub async fn execute(task: Task, session: Option<&Session>, gateway: &dyn StorageGateway) -> Event {
    match task {
        Task::ListBuckets => {
            let result = match session {
                Some(session) => gateway.list_buckets(session).await,
                None => Err(GatewayError::NoSession),
            };
            Event::BucketsLoaded(result)
        }
        Task::ListObjects(query) => {
            let result = match session {
                Some(session) => gateway.list_objects(session, &query).await,
                None => Err(GatewayError::NoSession),
            };
            Event::ObjectsLoaded { query, result }
        }
        Task::ValidateCredentials {
            access_key,
            secret_key,
        } => Event::CredentialsValidated(
            gateway
                .session_from_credentials(&access_key, &secret_key)
                .await,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BucketInfo, ObjectInfo, ObjectListing, ObjectQuery};
    use async_trait::async_trait;

    struct MemoryGateway {
        buckets: Vec<&'static str>,
    }

    #[async_trait]
    impl StorageGateway for MemoryGateway {
        async fn list_buckets(&self, _session: &Session) -> Result<Vec<BucketInfo>, GatewayError> {
            Ok(self
                .buckets
                .iter()
                .map(|name| BucketInfo {
                    name: name.to_string(),
                    creation_date: None,
                })
                .collect())
        }

        async fn list_objects(
            &self,
            _session: &Session,
            query: &ObjectQuery,
        ) -> Result<ObjectListing, GatewayError> {
            Ok(ObjectListing {
                directories: vec![format!("{}nested/", query.path)],
                files: vec![ObjectInfo {
                    key: format!("{}file.txt", query.path),
                    size: 3,
                    last_modified: None,
                    owner: None,
                }],
                next_token: None,
            })
        }

        async fn resolve_session(&self) -> Result<Session, GatewayError> {
            Err(GatewayError::MissingCredentials)
        }

        async fn session_from_credentials(
            &self,
            access_key: &str,
            _secret_key: &str,
        ) -> Result<Session, GatewayError> {
            if access_key == "good" {
                Ok(Session::offline())
            } else {
                Err(GatewayError::service("Credential check", "InvalidAccessKeyId"))
            }
        }
    }

    fn gateway() -> MemoryGateway {
        MemoryGateway {
            buckets: vec!["alpha", "beta"],
        }
    }

    #[tokio::test]
    async fn listing_without_a_session_fails() {
        let event = execute(Task::ListBuckets, None, &gateway()).await;
        assert!(matches!(
            event,
            Event::BucketsLoaded(Err(GatewayError::NoSession))
        ));
    }

    #[tokio::test]
    async fn buckets_are_listed_with_the_session() {
        let session = Session::offline();
        let event = execute(Task::ListBuckets, Some(&session), &gateway()).await;
        match event {
            Event::BucketsLoaded(Ok(buckets)) => assert_eq!(buckets.len(), 2),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn object_results_carry_their_query() {
        let session = Session::offline();
        let query = ObjectQuery::first_page("alpha", "docs/", "");
        let event = execute(Task::ListObjects(query.clone()), Some(&session), &gateway()).await;
        match event {
            Event::ObjectsLoaded {
                query: returned,
                result: Ok(listing),
            } => {
                assert_eq!(returned, query);
                assert_eq!(listing.directories, vec!["docs/nested/".to_string()]);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn credentials_are_checked_by_the_gateway() {
        let task = |key: &str| Task::ValidateCredentials {
            access_key: key.to_string(),
            secret_key: "secret".to_string(),
        };
        let accepted = execute(task("good"), None, &gateway()).await;
        assert!(matches!(accepted, Event::CredentialsValidated(Ok(_))));

        let rejected = execute(task("bad"), None, &gateway()).await;
        assert!(matches!(rejected, Event::CredentialsValidated(Err(_))));
    }

    #[tokio::test]
    async fn spawned_tasks_report_back_through_the_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_task(
            Task::ListBuckets,
            Some(Session::offline()),
            Arc::new(gateway()),
            tx,
        );
        let event = rx.recv().await;
        assert!(matches!(event, Some(Event::BucketsLoaded(Ok(_)))));
    }
}
