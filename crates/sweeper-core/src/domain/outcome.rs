//! Outcome model: what happened to each retained artifact, and the run summary.

use serde::{Deserialize, Serialize};

use super::artifact::Artifact;

/// Per-artifact result of the deletion step.
///
/// Serialized as SCREAMING_SNAKE_CASE: DELETED / DRY_RUN_SKIPPED / DELETE_FAILED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeletionStatus {
    Deleted,
    DryRunSkipped,
    DeleteFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    pub artifact: Artifact,
    #[serde(flatten)]
    pub status: DeletionStatus,
}

impl DeletionOutcome {
    pub fn deleted(artifact: Artifact) -> Self {
        Self {
            artifact,
            status: DeletionStatus::Deleted,
        }
    }

    pub fn dry_run(artifact: Artifact) -> Self {
        Self {
            artifact,
            status: DeletionStatus::DryRunSkipped,
        }
    }

    pub fn failed(artifact: Artifact, reason: impl Into<String>) -> Self {
        Self {
            artifact,
            status: DeletionStatus::DeleteFailed(reason.into()),
        }
    }
}

/// Summary of one sweep run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub dry_run: bool,
    pub pages_fetched: u32,
    pub evaluated: usize,
    pub retained: usize,
    pub outcomes: Vec<DeletionOutcome>,
}

impl SweepReport {
    pub fn deleted(&self) -> usize {
        self.count(|s| matches!(s, DeletionStatus::Deleted))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DeletionStatus::DryRunSkipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DeletionStatus::DeleteFailed(_)))
    }

    /// Total bytes held by the artifacts that were actually deleted.
    pub fn reclaimed_bytes(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| o.status == DeletionStatus::Deleted)
            .map(|o| o.artifact.size_in_bytes)
            .sum()
    }

    fn count(&self, pred: impl Fn(&DeletionStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}
