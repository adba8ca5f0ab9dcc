use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "debug.log";
const DEFAULT_DIRECTIVE: &str = "s3_viewer=debug";

/// Install a file-backed subscriber when `debug` is set. The terminal is
/// owned by the UI, so nothing is ever written to stdout or stderr.
pub fn init_logging(debug: bool) -> Result<Option<PathBuf>> {
    if !debug {
        return Ok(None);
    }

    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVE))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter)
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(Some(path))
}

fn log_path() -> PathBuf {
    ProjectDirs::from("", "", "s3-viewer")
        .map(|dirs| dirs.cache_dir().join(LOG_FILE))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE))
}
