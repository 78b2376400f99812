//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて 1 回の sweep を実装します。
//!
//! # 主要コンポーネント
//! - **SweeperBuilder**: Sweeper の構築とワイヤリング
//! - **Sweeper**: 検証 → 取得 → 削除
//! - **PageFetcher**: 1 ページの取得（timeout 付き）
//! - **Collector**: ページの fan-out とフィルタ適用
//! - **Deleter**: 逐次削除と dry run

pub mod builder;
pub mod collector;
pub mod config;
pub mod deleter;
pub mod fetcher;
pub mod sweeper;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, SweeperBuilder};
pub use self::collector::{Collector, Retrieval};
pub use self::config::{RunDeadline, SweepConfig};
pub use self::deleter::Deleter;
pub use self::fetcher::{Page, PageFetcher, SweepTarget};
pub use self::sweeper::{SweepRequest, Sweeper};
