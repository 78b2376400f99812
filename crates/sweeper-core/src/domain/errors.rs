//! Errors - エラー型と分類
//!
//! Run-level failures are [`SweepError`]. Problems with the filter
//! configuration are [`FilterConfigError`]; those fail closed and only become
//! fatal when strict validation is requested. Per-artifact delete failures
//! never show up here, they are recorded in
//! [`DeletionStatus`](super::outcome::DeletionStatus).

use std::time::Duration;

use thiserror::Error;

/// Errors reported by an [`ArtifactRepository`](crate::ports::ArtifactRepository).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

/// Fatal errors of a sweep run.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("owner is invalid: {0:?}")]
    InvalidOwner(String),

    #[error("repo is invalid: {0:?}")]
    InvalidRepo(String),

    #[error("failed to retrieve artifacts (page {page}): {source}")]
    Retrieval {
        page: u32,
        #[source]
        source: RepositoryError,
    },

    #[error(transparent)]
    FilterConfig(#[from] FilterConfigError),

    #[error("fetch task aborted: {0}")]
    TaskAborted(String),

    #[error("run cancelled")]
    Cancelled,

    #[error("run exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl SweepError {
    /// Precondition failures are detected before any network activity.
    pub fn is_precondition(&self) -> bool {
        matches!(self, SweepError::InvalidOwner(_) | SweepError::InvalidRepo(_))
    }

    /// Operator interrupt or deadline expiry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SweepError::Cancelled | SweepError::DeadlineExceeded(_))
    }
}

/// A filter criterion that cannot be evaluated.
///
/// The criterion rejects every artifact it is asked about.
#[derive(Debug, Clone, Error)]
pub enum FilterConfigError {
    #[error("failed to compile the pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("failed to parse the active duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("active duration must be positive, got {0:?}")]
    NonPositiveDuration(String),
}
