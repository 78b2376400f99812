//! InMemoryArtifactRepository - 開発・テスト用の ArtifactRepository
//!
//! Artifacts live in a `Vec` and are served in pages exactly like the
//! provider would. Faults (failing pages, failing deletes, latency) can be
//! injected, and every call is counted so tests can assert on traffic.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Artifact, ArtifactId, RepoRef, RepositoryError, RunId};
use crate::ports::ArtifactRepository;

#[derive(Default)]
struct InMemoryState {
    /// All artifacts, in listing order.
    artifacts: Vec<Artifact>,

    /// Artifacts produced by each workflow run.
    runs: HashMap<RunId, Vec<ArtifactId>>,
}

/// In-memory repository.
///
/// # 使用例
/// ```ignore
/// let repo = InMemoryArtifactRepository::with_artifacts(artifacts)
///     .fail_page(2)
///     .with_latency(Duration::from_millis(5));
/// ```
#[derive(Default)]
pub struct InMemoryArtifactRepository {
    state: Mutex<InMemoryState>,
    latency: Option<Duration>,
    failing_pages: HashSet<u32>,
    failing_deletes: HashSet<ArtifactId>,
    list_calls: AtomicUsize,
    run_list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl InMemoryArtifactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifacts(artifacts: Vec<Artifact>) -> Self {
        Self {
            state: Mutex::new(InMemoryState {
                artifacts,
                runs: HashMap::new(),
            }),
            ..Self::default()
        }
    }

    /// Attribute existing artifacts to a workflow run.
    pub fn with_run(mut self, run_id: RunId, artifact_ids: Vec<ArtifactId>) -> Self {
        self.state.get_mut().runs.insert(run_id, artifact_ids);
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Listing `page` (in either mode) fails with a server error.
    pub fn fail_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    /// Deleting `artifact_id` fails with a server error.
    pub fn fail_delete(mut self, artifact_id: ArtifactId) -> Self {
        self.failing_deletes.insert(artifact_id);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn run_list_calls(&self) -> usize {
        self.run_list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Artifacts that have not been deleted yet.
    pub async fn remaining(&self) -> Vec<Artifact> {
        self.state.lock().await.artifacts.clone()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_page(&self, page: u32) -> Result<(), RepositoryError> {
        if page == 0 {
            return Err(RepositoryError::Other("pages are 1-indexed".to_string()));
        }
        if self.failing_pages.contains(&page) {
            return Err(RepositoryError::Api {
                status: 500,
                body: format!("injected failure on page {page}"),
            });
        }
        Ok(())
    }
}

fn slice_page(items: Vec<Artifact>, page: u32, page_size: u32) -> Vec<Artifact> {
    let start = (page as usize - 1).saturating_mul(page_size as usize);
    items
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect()
}

#[async_trait]
impl ArtifactRepository for InMemoryArtifactRepository {
    async fn list_artifacts(
        &self,
        _repo: &RepoRef,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Artifact>, RepositoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.check_page(page)?;

        let all = self.state.lock().await.artifacts.clone();
        Ok(slice_page(all, page, page_size))
    }

    async fn list_artifacts_for_run(
        &self,
        _repo: &RepoRef,
        run_id: RunId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Artifact>, RepositoryError> {
        self.run_list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.check_page(page)?;

        let in_run = {
            let state = self.state.lock().await;
            let Some(ids) = state.runs.get(&run_id) else {
                return Err(RepositoryError::Api {
                    status: 404,
                    body: format!("{run_id} not found"),
                });
            };
            state
                .artifacts
                .iter()
                .filter(|a| ids.contains(&a.id))
                .cloned()
                .collect()
        };
        Ok(slice_page(in_run, page, page_size))
    }

    async fn delete_artifact(
        &self,
        _repo: &RepoRef,
        artifact_id: ArtifactId,
    ) -> Result<(), RepositoryError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.failing_deletes.contains(&artifact_id) {
            return Err(RepositoryError::Api {
                status: 500,
                body: format!("injected failure deleting {artifact_id}"),
            });
        }

        let mut state = self.state.lock().await;
        let before = state.artifacts.len();
        state.artifacts.retain(|a| a.id != artifact_id);
        if state.artifacts.len() == before {
            return Err(RepositoryError::Api {
                status: 404,
                body: format!("{artifact_id} not found"),
            });
        }
        Ok(())
    }
}
