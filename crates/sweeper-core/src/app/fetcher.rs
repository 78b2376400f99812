//! PageFetcher - 1 ページ分の artifact を取得
//!
//! # フロー
//! 1. run_id があれば run 単位、なければ repository 全体を問い合わせる
//! 2. per-page timeout で打ち切る
//! 3. 空でなければ次のページ番号を返す（fork するのは Collector）

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Artifact, RepoRef, RepositoryError, RunId, SweepError};
use crate::ports::ArtifactRepository;

/// What a run looks at: one repository, optionally narrowed to one workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepTarget {
    pub repo: RepoRef,
    pub run_id: Option<RunId>,
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: u32,
    pub artifacts: Vec<Artifact>,
}

impl Page {
    /// The page to fetch after this one. An empty page ends the listing.
    pub fn next(&self) -> Option<u32> {
        if self.artifacts.is_empty() {
            None
        } else {
            Some(self.number + 1)
        }
    }
}

pub struct PageFetcher {
    repository: Arc<dyn ArtifactRepository>,
    target: SweepTarget,
    page_size: u32,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(
        repository: Arc<dyn ArtifactRepository>,
        target: SweepTarget,
        page_size: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            target,
            page_size,
            timeout,
        }
    }

    pub fn target(&self) -> &SweepTarget {
        &self.target
    }

    /// Fetch page `page` (1-indexed).
    pub async fn fetch(&self, page: u32) -> Result<Page, SweepError> {
        let repo = &self.target.repo;
        let request = async {
            match self.target.run_id {
                Some(run_id) => {
                    tracing::debug!(%run_id, page, "querying artifacts for a specific run");
                    self.repository
                        .list_artifacts_for_run(repo, run_id, page, self.page_size)
                        .await
                }
                None => {
                    tracing::debug!(page, "querying artifacts across all workflows");
                    self.repository
                        .list_artifacts(repo, page, self.page_size)
                        .await
                }
            }
        };

        let artifacts = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(artifacts)) => artifacts,
            Ok(Err(source)) => return Err(SweepError::Retrieval { page, source }),
            Err(_) => {
                return Err(SweepError::Retrieval {
                    page,
                    source: RepositoryError::Timeout(self.timeout),
                });
            }
        };

        if artifacts.is_empty() {
            tracing::debug!(page, "zero artifacts remaining for query");
        }
        Ok(Page {
            number: page,
            artifacts,
        })
    }
}
