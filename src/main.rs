mod app;
mod aws;
mod error;
mod logging;
mod models;
mod pages;
mod tui;

use std::process::ExitCode;
use std::sync::Arc;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use tracing::{error, info, warn};

use aws::{S3Gateway, StorageGateway};

/// Browse S3 buckets and objects from the terminal.
#[derive(Debug, Parser)]
#[command(name = "s3-viewer", version, about)]
struct Cli {
    /// Write diagnostic logs to debug.log in the cache directory.
    #[arg(
        long,
        env = "S3_VIEWER_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match logging::init_logging(cli.debug) {
        Ok(Some(path)) => info!(path = %path.display(), "debug logging enabled"),
        Ok(None) => {}
        Err(err) => eprintln!("Failed to set up logging: {err:#}"),
    }

    let gateway: Arc<dyn StorageGateway> = Arc::new(S3Gateway);
    let session = match gateway.resolve_session().await {
        Ok(session) => Some(session),
        Err(err) => {
            warn!(error = %err, "starting without a session");
            None
        }
    };

    if let Err(err) = tui::run(session, gateway).await {
        error!(error = %format!("{err:#}"), "application error");
        eprintln!("Application error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
