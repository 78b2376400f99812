//! sweeper-github
//!
//! GitHub REST API implementation of
//! [`ArtifactRepository`](sweeper_core::ArtifactRepository).

pub mod client;
pub mod wire;

pub use client::{ClientError, DEFAULT_API_URL, GitHubArtifactRepository};
