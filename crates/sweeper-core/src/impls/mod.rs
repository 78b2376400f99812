//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryArtifactRepository**: テスト用の ArtifactRepository
//!
//! # 本番用実装
//! 本番用の実装は別クレートに配置します：
//! - `sweeper-github`: GitHubArtifactRepository

pub mod inmem_repository;

pub use self::inmem_repository::InMemoryArtifactRepository;
