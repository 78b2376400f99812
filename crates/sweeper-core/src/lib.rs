//! sweeper-core
//!
//! Finds and deletes GitHub Actions artifacts that match a set of criteria.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, artifact, criteria, filter, outcome, errors）
//! - **ports**: 抽象化レイヤー（ArtifactRepository, Clock）
//! - **app**: アプリケーションロジック（builder, fetcher, collector, deleter, sweeper）
//! - **impls**: 実装（InMemoryArtifactRepository など開発用）

pub mod domain;
pub mod ports;
pub mod app;
pub mod impls;

pub use app::{BuildError, SweepConfig, SweepRequest, Sweeper, SweeperBuilder};
pub use domain::{
    Artifact, ArtifactId, DeletionOutcome, DeletionStatus, Filter, FilterConfigError,
    FilterCriteria, RepoRef, RepositoryError, RunId, SweepError, SweepReport,
};
pub use ports::{ArtifactRepository, Clock, FixedClock, SystemClock};
