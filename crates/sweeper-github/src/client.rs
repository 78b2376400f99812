//! HTTP client for the GitHub Actions artifacts API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use sweeper_core::{Artifact, ArtifactId, ArtifactRepository, RepoRef, RepositoryError, RunId};

use crate::wire::ListArtifactsResponse;

/// Public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("delete-artifacts/", env!("CARGO_PKG_VERSION"));

/// Errors while constructing the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("token is empty")]
    EmptyToken,

    #[error("failed to create HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// [`ArtifactRepository`] backed by the GitHub REST API.
pub struct GitHubArtifactRepository {
    client: Client,
    base_url: String,
    token: String,
}

impl GitHubArtifactRepository {
    /// Creates a client for `api_url` (e.g. [`DEFAULT_API_URL`] or a GHES
    /// `https://host/api/v3`).
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be
    /// constructed.
    pub fn new(api_url: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ClientError::EmptyToken);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn artifacts_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}/actions/artifacts",
            self.base_url,
            repo.owner(),
            repo.repo()
        )
    }

    fn run_artifacts_url(&self, repo: &RepoRef, run_id: RunId) -> String {
        format!(
            "{}/repos/{}/{}/actions/runs/{}/artifacts",
            self.base_url,
            repo.owner(),
            repo.repo(),
            run_id.get()
        )
    }

    fn artifact_url(&self, repo: &RepoRef, artifact_id: ArtifactId) -> String {
        format!("{}/{}", self.artifacts_url(repo), artifact_id.get())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RepositoryError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(RepositoryError::Api { status, body })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        page: u32,
        page_size: u32,
    ) -> Result<T, RepositoryError> {
        let request = self
            .client
            .get(url)
            .query(&[("per_page", page_size), ("page", page)]);
        let response = self.send(request).await?;

        response.json().await.map_err(|e| {
            if e.is_decode() {
                RepositoryError::Decode(e.to_string())
            } else {
                RepositoryError::Transport(e.to_string())
            }
        })
    }

    async fn list(
        &self,
        url: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Artifact>, RepositoryError> {
        let listing: ListArtifactsResponse = self.get_json(url, page, page_size).await?;
        // expired artifacts are still listed; the filter decides what happens to them
        let expired = listing.artifacts.iter().filter(|a| a.expired).count();
        tracing::trace!(
            page,
            total_count = listing.total_count,
            received = listing.artifacts.len(),
            expired,
            "listed artifacts"
        );
        Ok(listing.artifacts.into_iter().map(Artifact::from).collect())
    }
}

#[async_trait]
impl ArtifactRepository for GitHubArtifactRepository {
    async fn list_artifacts(
        &self,
        repo: &RepoRef,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Artifact>, RepositoryError> {
        self.list(&self.artifacts_url(repo), page, page_size).await
    }

    async fn list_artifacts_for_run(
        &self,
        repo: &RepoRef,
        run_id: RunId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Artifact>, RepositoryError> {
        self.list(&self.run_artifacts_url(repo, run_id), page, page_size)
            .await
    }

    async fn delete_artifact(
        &self,
        repo: &RepoRef,
        artifact_id: ArtifactId,
    ) -> Result<(), RepositoryError> {
        let request = self.client.delete(self.artifact_url(repo, artifact_id));
        self.send(request).await?;
        Ok(())
    }
}
