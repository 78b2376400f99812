//! Run tunables and the shared run deadline.

use std::time::Duration;

use tokio::time::Instant;

/// Tunables of a sweep run. `Default` carries the reference values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Artifacts requested per page.
    pub page_size: u32,

    /// Upper bound for a single page request.
    pub page_timeout: Duration,

    /// Upper bound for the whole run (retrieval and deletion).
    pub run_timeout: Duration,

    /// Treat an unusable pattern or duration as a fatal error up front instead
    /// of silently rejecting every artifact.
    pub strict_filters: bool,
}

impl SweepConfig {
    /// Largest page size the provider accepts.
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Longest page or run timeout accepted.
    pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            page_size: Self::MAX_PAGE_SIZE,
            page_timeout: Duration::from_secs(30),
            run_timeout: Duration::from_secs(120),
            strict_filters: false,
        }
    }
}

/// Point in time by which the whole run must be over.
#[derive(Debug, Clone, Copy)]
pub struct RunDeadline {
    pub at: Instant,
    pub budget: Duration,
}

impl RunDeadline {
    /// Budgets past [`SweepConfig::MAX_TIMEOUT`] are clamped to it.
    pub fn starting_now(budget: Duration) -> Self {
        let budget = budget.min(SweepConfig::MAX_TIMEOUT);
        let now = Instant::now();
        Self {
            at: now.checked_add(budget).unwrap_or(now),
            budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let config = SweepConfig::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.page_timeout, Duration::from_secs(30));
        assert_eq!(config.run_timeout, Duration::from_secs(120));
        assert!(!config.strict_filters);
    }

    #[tokio::test]
    async fn deadline_is_in_the_future() {
        let deadline = RunDeadline::starting_now(Duration::from_secs(5));
        assert!(deadline.at > Instant::now());
        assert_eq!(deadline.budget, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn oversized_budget_is_clamped() {
        let deadline = RunDeadline::starting_now(Duration::MAX);
        assert_eq!(deadline.budget, SweepConfig::MAX_TIMEOUT);
        assert!(deadline.at > Instant::now());
    }
}
