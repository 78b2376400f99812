//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（CI provider の API、時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod artifact_repository;
pub mod clock;

// 主要な trait を再エクスポート
pub use self::artifact_repository::ArtifactRepository;
pub use self::clock::{Clock, FixedClock, SystemClock};
