//! # sweeper-cli
//!
//! Command-line front end of the artifact sweeper (`delete-artifacts`).
//!
//! ## Configuration
//!
//! Flags fall back to the environment a GitHub Actions job provides:
//!
//! - `GITHUB_ACTOR` - owner / organisation
//! - `GITHUB_REPO` - repository name
//! - `GITHUB_TOKEN` - API token (required)
//! - `GITHUB_API_URL` - API endpoint (default: `https://api.github.com`)
//! - `LOG_LEVEL` - log filter (default: `info`)

pub mod output;

use std::future::Future;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;

use sweeper_core::{FilterCriteria, RunId, SweepReport, SweepRequest, SweeperBuilder};
use sweeper_github::{DEFAULT_API_URL, GitHubArtifactRepository};

/// Delete GitHub Actions artifacts matching size, name and age criteria.
#[derive(Debug, Parser)]
#[command(name = "delete-artifacts")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// GitHub owner / org name.
    #[arg(short, long, env = "GITHUB_ACTOR")]
    pub owner: Option<String>,

    /// GitHub repo name.
    #[arg(short, long, env = "GITHUB_REPO")]
    pub repo: Option<String>,

    /// The workflow run id from which to delete artifacts.
    #[arg(short = 'i', long)]
    pub run_id: Option<u64>,

    /// Minimum size in bytes. Smaller artifacts are kept.
    #[arg(long = "min", default_value_t = 50_000_000)]
    pub min_bytes: u64,

    /// Maximum size in bytes. Larger artifacts are kept.
    #[arg(long = "max")]
    pub max_bytes: Option<u64>,

    /// Exact artifact name to delete.
    #[arg(short, long)]
    pub name: Option<String>,

    /// POSIX regex matched against the artifact name. Perl classes such as `\d` are rejected.
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Artifacts created within this window are considered active and kept (e.g. `23h59m`).
    #[arg(short, long = "active")]
    pub active_duration: Option<String>,

    /// Report what would be deleted without deleting anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Fail before any API call if the pattern or duration is unusable.
    #[arg(long)]
    pub strict: bool,

    /// API server URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// API token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Report format.
    #[arg(long, default_value = "text")]
    pub format: output::OutputFormat,
}

impl Cli {
    /// The request this invocation describes.
    #[must_use]
    pub fn request(&self) -> SweepRequest {
        let criteria = FilterCriteria::new()
            .with_min_bytes(self.min_bytes)
            .with_max_bytes(self.max_bytes)
            .with_exact_name(self.name.clone())
            .with_name_pattern(self.pattern.clone())
            .with_active_duration(self.active_duration.clone());

        SweepRequest {
            owner: self.owner.clone().unwrap_or_default(),
            repo: self.repo.clone().unwrap_or_default(),
            run_id: self.run_id.map(RunId::new),
            criteria,
            dry_run: self.dry_run,
        }
    }

    /// # Errors
    ///
    /// Returns an error if no token was given on the command line or in `GITHUB_TOKEN`.
    pub fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .context("GITHUB_TOKEN is required (set the variable or pass --token)")
    }
}

/// Wire the GitHub client into a sweeper and execute one run.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the run fails. Run
/// failures keep their [`SweepError`](sweeper_core::SweepError) so callers
/// can downcast them.
pub async fn execute(cli: &Cli, cancel: watch::Receiver<bool>) -> Result<SweepReport> {
    let repository = GitHubArtifactRepository::new(&cli.api_url, cli.token()?)
        .context("failed to construct the GitHub client")?;

    let sweeper = SweeperBuilder::new()
        .repository(Arc::new(repository))
        .strict_filters(cli.strict)
        .build()
        .context("unable to construct application with specific parameters")?;

    let report = sweeper.run(cli.request(), cancel).await?;
    Ok(report)
}

/// Resolves with the signal's name on Ctrl+C or, on Unix, SIGTERM.
///
/// # Errors
///
/// Returns an error if a signal handler cannot be installed.
pub async fn shutdown_signal() -> io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            interrupted = tokio::signal::ctrl_c() => interrupted.map(|()| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|()| "SIGINT")
    }
}

/// Spawn a task that flips the returned channel to `true` once `signal` resolves.
pub fn cancel_on<F>(signal: F) -> watch::Receiver<bool>
where
    F: Future<Output = io::Result<&'static str>> + Send + 'static,
{
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal.await {
            Ok(name) => {
                tracing::warn!(signal = name, "received signal, cancelling the run");
                let _ = tx.send(true);
            }
            Err(e) => tracing::warn!(error = %e, "failed to install the signal handler"),
        }
    });
    rx
}
