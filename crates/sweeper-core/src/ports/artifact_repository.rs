//! ArtifactRepository port - CI provider の artifact API
//!
//! The core only needs to list artifacts page by page and delete them one at a
//! time. Authentication, transport and transport-level retries belong to the
//! implementation.
//!
//! # 実装
//! - **GitHubArtifactRepository** (`sweeper-github`): 本番用
//! - **InMemoryArtifactRepository** (`impls`): テスト・開発用

use async_trait::async_trait;

use crate::domain::{Artifact, ArtifactId, RepoRef, RepositoryError, RunId};

/// Access to the artifacts of one repository.
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数の fetch task から同時に使われる）
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// One page of artifacts across every workflow run. Pages are 1-indexed;
    /// an empty page means there is nothing further.
    async fn list_artifacts(
        &self,
        repo: &RepoRef,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Artifact>, RepositoryError>;

    /// One page of artifacts produced by a single workflow run.
    async fn list_artifacts_for_run(
        &self,
        repo: &RepoRef,
        run_id: RunId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Artifact>, RepositoryError>;

    async fn delete_artifact(
        &self,
        repo: &RepoRef,
        artifact_id: ArtifactId,
    ) -> Result<(), RepositoryError>;
}
