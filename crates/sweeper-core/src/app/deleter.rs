//! Deleter - 残った artifact を順番に削除
//!
//! Deletes run one at a time. A failed delete is recorded and the batch goes
//! on; only cancellation stops it.

use std::sync::Arc;

use tokio::sync::watch;

use crate::app::config::RunDeadline;
use crate::domain::{Artifact, DeletionOutcome, RepoRef, SweepError};
use crate::ports::ArtifactRepository;

pub struct Deleter {
    repository: Arc<dyn ArtifactRepository>,
    repo: RepoRef,
}

impl Deleter {
    pub fn new(repository: Arc<dyn ArtifactRepository>, repo: RepoRef) -> Self {
        Self { repository, repo }
    }

    /// Delete (or, on a dry run, only report) every retained artifact.
    ///
    /// Each delete must finish before the run deadline; one that does not is
    /// recorded as failed. A cancellation seen between two deletes returns
    /// [`SweepError::Cancelled`].
    pub async fn apply(
        &self,
        retained: Vec<Artifact>,
        dry_run: bool,
        deadline: RunDeadline,
        cancel: &watch::Receiver<bool>,
    ) -> Result<Vec<DeletionOutcome>, SweepError> {
        if retained.is_empty() {
            tracing::info!("No artifacts to delete!");
            return Ok(Vec::new());
        }
        tracing::debug!(count = retained.len(), "total number of artifacts to delete");

        if dry_run {
            return Ok(retained
                .into_iter()
                .map(|artifact| {
                    tracing::warn!(
                        size = artifact.size_in_bytes,
                        name = %artifact.name,
                        "DryRun: would have deleted the artifact"
                    );
                    DeletionOutcome::dry_run(artifact)
                })
                .collect());
        }

        let mut outcomes = Vec::with_capacity(retained.len());
        for artifact in retained {
            if *cancel.borrow() {
                tracing::warn!(
                    done = outcomes.len(),
                    "deletion cancelled, remaining artifacts are kept"
                );
                return Err(SweepError::Cancelled);
            }
            outcomes.push(self.delete_one(artifact, deadline).await);
        }
        Ok(outcomes)
    }

    async fn delete_one(&self, artifact: Artifact, deadline: RunDeadline) -> DeletionOutcome {
        tracing::info!(
            size = artifact.size_in_bytes,
            name = %artifact.name,
            "Deleting artifact"
        );

        let request = self.repository.delete_artifact(&self.repo, artifact.id);
        let reason = match tokio::time::timeout_at(deadline.at, request).await {
            Ok(Ok(())) => return DeletionOutcome::deleted(artifact),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "deadline exceeded".to_string(),
        };

        tracing::warn!(
            id = artifact.id.get(),
            name = %artifact.name,
            error = %reason,
            "error deleting artifact, ignoring"
        );
        DeletionOutcome::failed(artifact, reason)
    }
}
