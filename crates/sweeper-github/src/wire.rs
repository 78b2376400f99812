//! Wire types of the GitHub Actions artifacts API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use sweeper_core::{Artifact, ArtifactId};

/// Body of both artifact listing endpoints.
#[derive(Debug, Deserialize)]
pub struct ListArtifactsResponse {
    pub total_count: u64,
    pub artifacts: Vec<WireArtifact>,
}

#[derive(Debug, Deserialize)]
pub struct WireArtifact {
    pub id: u64,
    pub name: String,
    pub size_in_bytes: u64,
    /// Nullable in the API schema.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expired: bool,
}

impl From<WireArtifact> for Artifact {
    /// A missing creation time reads as the epoch, so the artifact counts as old.
    fn from(wire: WireArtifact) -> Self {
        Artifact::new(
            ArtifactId::new(wire.id),
            wire.name,
            wire.size_in_bytes,
            wire.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BODY: &str = r#"{
        "total_count": 2,
        "artifacts": [
            {
                "id": 11,
                "node_id": "MDg6QXJ0aWZhY3QxMQ==",
                "name": "Rails",
                "size_in_bytes": 556,
                "url": "https://api.github.com/repos/octo-org/octo-docs/actions/artifacts/11",
                "archive_download_url": "https://api.github.com/repos/octo-org/octo-docs/actions/artifacts/11/zip",
                "expired": false,
                "created_at": "2020-01-10T14:59:22Z",
                "expires_at": "2020-03-21T14:59:22Z",
                "updated_at": "2020-02-21T14:59:22Z"
            },
            {
                "id": 13,
                "name": "Test output",
                "size_in_bytes": 453,
                "expired": true,
                "created_at": null
            }
        ]
    }"#;

    #[test]
    fn decodes_listing_and_ignores_unknown_fields() {
        let response: ListArtifactsResponse = serde_json::from_str(BODY).unwrap();
        assert_eq!(response.total_count, 2);
        assert_eq!(response.artifacts.len(), 2);
        assert!(response.artifacts[1].expired);

        let first = Artifact::from(response.artifacts.into_iter().next().unwrap());
        assert_eq!(first.id, ArtifactId::new(11));
        assert_eq!(first.name, "Rails");
        assert_eq!(first.size_in_bytes, 556);
        assert_eq!(
            first.created_at,
            Utc.with_ymd_and_hms(2020, 1, 10, 14, 59, 22).unwrap()
        );
    }

    #[test]
    fn null_creation_time_reads_as_epoch() {
        let response: ListArtifactsResponse = serde_json::from_str(BODY).unwrap();
        let second = Artifact::from(response.artifacts.into_iter().nth(1).unwrap());
        assert_eq!(second.created_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn empty_listing() {
        let response: ListArtifactsResponse =
            serde_json::from_str(r#"{"total_count": 0, "artifacts": []}"#).unwrap();
        assert!(response.artifacts.is_empty());
    }
}
