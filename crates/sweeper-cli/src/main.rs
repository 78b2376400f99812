//! `delete-artifacts` - removes GitHub Actions artifacts matching the given criteria.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sweeper_cli::{Cli, output};
use sweeper_core::SweepError;

/// Exit status after an operator interrupt (128 + SIGINT).
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let cancel = sweeper_cli::cancel_on(sweeper_cli::shutdown_signal());
    match sweeper_cli::execute(&cli, cancel).await {
        Ok(report) => match output::render(&report, cli.format) {
            Ok(rendered) => {
                println!("{rendered}");
                tracing::info!("Run complete.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "failed to render the report");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            if let Some(SweepError::Cancelled) = e.downcast_ref::<SweepError>() {
                tracing::warn!("run interrupted");
                return ExitCode::from(EXIT_INTERRUPTED);
            }
            tracing::error!(error = %format!("{e:#}"), "execution failed.");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so the report on stdout stays machine readable.
/// `LOG_LEVEL` defaults to `info`; an unparsable level falls back to `debug`.
fn init_tracing() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
