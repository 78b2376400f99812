//! Filter criteria as configured by the operator.
//!
//! Criteria are plain values; [`Filter`](super::filter::Filter) compiles them
//! into something that can be evaluated.

use serde::{Deserialize, Serialize};

/// The configured predicate parameters of a run.
///
/// Every configured criterion must match for an artifact to be retained.
/// Empty strings are treated the same as "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    min_bytes: u64,
    max_bytes: Option<u64>,
    exact_name: Option<String>,
    name_pattern: Option<String>,
    active_duration: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_bytes(mut self, min_bytes: u64) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: Option<u64>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_exact_name(mut self, name: Option<impl Into<String>>) -> Self {
        self.exact_name = non_empty(name);
        self
    }

    pub fn with_name_pattern(mut self, pattern: Option<impl Into<String>>) -> Self {
        self.name_pattern = non_empty(pattern);
        self
    }

    /// Recency window, e.g. `23h59m`. Artifacts younger than this are kept.
    pub fn with_active_duration(mut self, duration: Option<impl Into<String>>) -> Self {
        self.active_duration = non_empty(duration);
        self
    }

    pub fn min_bytes(&self) -> u64 {
        self.min_bytes
    }

    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    pub fn exact_name(&self) -> Option<&str> {
        self.exact_name.as_deref()
    }

    pub fn name_pattern(&self) -> Option<&str> {
        self.name_pattern.as_deref()
    }

    pub fn active_duration(&self) -> Option<&str> {
        self.active_duration.as_deref()
    }
}

fn non_empty(value: Option<impl Into<String>>) -> Option<String> {
    value.map(Into::into).filter(|s| !s.is_empty())
}
