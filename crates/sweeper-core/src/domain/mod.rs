//! Domain model (IDs, artifacts, criteria, filter, outcomes, errors).
//!
//! No I/O happens here: everything in this module can be exercised with plain
//! values and a fixed clock.

pub mod artifact;
pub mod criteria;
pub mod errors;
pub mod filter;
pub mod ids;
pub mod outcome;

pub use artifact::{Artifact, RepoRef};
pub use criteria::FilterCriteria;
pub use errors::{FilterConfigError, RepositoryError, SweepError};
pub use filter::{Filter, evaluate};
pub use ids::{ArtifactId, RunId};
pub use outcome::{DeletionOutcome, DeletionStatus, SweepReport};
