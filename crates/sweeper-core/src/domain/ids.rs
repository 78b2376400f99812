//! Domain identifiers (strongly-typed IDs).
//!
//! GitHub は artifact と workflow run に数値 ID を振ります。
//! 同じ `u64` でも混同しないように、Phantom type パターンで型を分けています。
//!
//! ## Phantom Type パターン
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時の型安全性を提供します。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"artifact-", "run-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// Serialized as the bare number so it matches the provider's wire format.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<T: IdMarker> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Artifact のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Artifact {}

impl IdMarker for Artifact {
    fn prefix() -> &'static str {
        "artifact-"
    }
}

/// Workflow run のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Run {}

impl IdMarker for Run {
    fn prefix() -> &'static str {
        "run-"
    }
}

/// Identifier of an artifact (the unit of deletion).
pub type ArtifactId = Id<Artifact>;

/// Identifier of a workflow run (scopes a listing to one run).
pub type RunId = Id<Run>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_the_marker_prefix() {
        assert_eq!(ArtifactId::new(42).to_string(), "artifact-42");
        assert_eq!(RunId::new(7).to_string(), "run-7");
    }

    #[test]
    fn serializes_as_bare_number() {
        let id = ArtifactId::new(11);
        assert_eq!(serde_json::to_string(&id).unwrap(), "11");

        let back: ArtifactId = serde_json::from_str("11").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;

        assert_eq!(size_of::<ArtifactId>(), size_of::<u64>());
        assert_eq!(size_of::<RunId>(), size_of::<u64>());
    }
}
