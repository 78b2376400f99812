//! Artifact metadata and the repository it lives in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::SweepError;
use super::ids::ArtifactId;

/// A named, sized, timestamped build output as reported by the CI provider.
///
/// The core never mutates an artifact; it only decides whether to delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub name: String,
    pub size_in_bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(
        id: ArtifactId,
        name: impl Into<String>,
        size_in_bytes: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            size_in_bytes,
            created_at,
        }
    }
}

/// Owner/repository pair a run operates on.
///
/// Both parts must be at least two characters long; anything shorter is
/// rejected before a single request is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoRef {
    owner: String,
    repo: String,
}

impl RepoRef {
    const MIN_LEN: usize = 2;

    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, SweepError> {
        let owner = owner.into();
        let repo = repo.into();
        if owner.chars().count() < Self::MIN_LEN {
            return Err(SweepError::InvalidOwner(owner));
        }
        if repo.chars().count() < Self::MIN_LEN {
            return Err(SweepError::InvalidRepo(repo));
        }
        Ok(Self { owner, repo })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
