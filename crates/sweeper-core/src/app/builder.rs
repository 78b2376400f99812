//! SweeperBuilder - Sweeper の構築とワイヤリング
//!
//! 起動時検証（Fail-fast）: 不正な設定は build() で BuildError になり、
//! ネットワークに触れる前に失敗する。

use std::sync::Arc;
use std::time::Duration;

use crate::app::config::SweepConfig;
use crate::app::sweeper::Sweeper;
use crate::ports::{ArtifactRepository, Clock, SystemClock};

/// SweeperBuilder は Sweeper を構築
///
/// # 使用例
/// ```ignore
/// let sweeper = SweeperBuilder::new()
///     .repository(Arc::new(GitHubArtifactRepository::new(api_url, token)?))
///     .strict_filters(true)
///     .build()?;
/// ```
pub struct SweeperBuilder {
    repository: Option<Arc<dyn ArtifactRepository>>,
    clock: Arc<dyn Clock>,
    config: SweepConfig,
}

/// BuildError は Sweeper 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no artifact repository configured")]
    MissingRepository,

    #[error("page size must be between 1 and {max}, got {got}")]
    InvalidPageSize { got: u32, max: u32 },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("{name} must not exceed {max:?}")]
    TimeoutTooLong { name: &'static str, max: Duration },
}

impl SweeperBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            clock: Arc::new(SystemClock),
            config: SweepConfig::default(),
        }
    }

    pub fn repository(mut self, repository: Arc<dyn ArtifactRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Source of "now" for the active-duration filter. Defaults to the wall clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace every tunable at once.
    pub fn config(mut self, config: SweepConfig) -> Self {
        self.config = config;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.config.page_timeout = timeout;
        self
    }

    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.config.run_timeout = timeout;
        self
    }

    pub fn strict_filters(mut self, strict: bool) -> Self {
        self.config.strict_filters = strict;
        self
    }

    /// # 検証
    /// - repository が設定されていること
    /// - page_size が 1..=MAX_PAGE_SIZE
    /// - timeout がゼロでなく、MAX_TIMEOUT 以下であること
    pub fn build(self) -> Result<Sweeper, BuildError> {
        let repository = self.repository.ok_or(BuildError::MissingRepository)?;

        let config = self.config;
        if config.page_size == 0 || config.page_size > SweepConfig::MAX_PAGE_SIZE {
            return Err(BuildError::InvalidPageSize {
                got: config.page_size,
                max: SweepConfig::MAX_PAGE_SIZE,
            });
        }
        if config.page_timeout.is_zero() {
            return Err(BuildError::ZeroTimeout("page timeout"));
        }
        if config.run_timeout.is_zero() {
            return Err(BuildError::ZeroTimeout("run timeout"));
        }
        for (name, timeout) in [
            ("page timeout", config.page_timeout),
            ("run timeout", config.run_timeout),
        ] {
            if timeout > SweepConfig::MAX_TIMEOUT {
                return Err(BuildError::TimeoutTooLong {
                    name,
                    max: SweepConfig::MAX_TIMEOUT,
                });
            }
        }

        Ok(Sweeper {
            repository,
            clock: self.clock,
            config,
        })
    }
}

impl Default for SweeperBuilder {
    fn default() -> Self {
        Self::new()
    }
}
