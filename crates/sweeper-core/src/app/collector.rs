//! Collector - ページの fan-out 取得とフィルタ適用
//!
//! # フロー
//! 1. page 1 の取得タスクを JoinSet に積む
//! 2. 完了したページが空でなければ次ページのタスクを積む
//! 3. ページ内の artifact を Filter にかけ、残ったものを蓄積
//! 4. JoinSet が空になったら終了
//!
//! The first failing page ends the run. Cancellation and the run deadline are
//! checked before task completions; returning early drops the `JoinSet`,
//! which aborts every fetch still in flight.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::app::config::RunDeadline;
use crate::app::fetcher::{Page, PageFetcher};
use crate::domain::{Artifact, Filter, SweepError};
use crate::ports::Clock;

/// Everything the retrieval phase produced.
#[derive(Debug, Clone, Default)]
pub struct Retrieval {
    /// Artifacts that passed the filter. Order across pages is arrival order.
    pub retained: Vec<Artifact>,

    /// Artifacts looked at, retained or not.
    pub evaluated: usize,

    /// Pages fetched, including the terminating empty page.
    pub pages_fetched: u32,
}

impl Retrieval {
    fn absorb(&mut self, filter: &Filter, page: Page, clock: &dyn Clock) {
        self.pages_fetched += 1;
        self.evaluated += page.artifacts.len();
        if page.artifacts.is_empty() {
            return;
        }
        let kept = filter.filter_batch(&page.artifacts, clock.now());
        self.retained.extend(kept);
    }
}

pub struct Collector {
    fetcher: Arc<PageFetcher>,
    clock: Arc<dyn Clock>,
}

impl Collector {
    pub fn new(fetcher: Arc<PageFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self { fetcher, clock }
    }

    /// Walk every page of the target and keep what `filter` accepts.
    pub async fn collect(
        &self,
        filter: &Filter,
        deadline: RunDeadline,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<Retrieval, SweepError> {
        let mut in_flight: JoinSet<Result<Page, SweepError>> = JoinSet::new();
        let mut retrieval = Retrieval::default();
        let mut watching = true;

        let expiry = tokio::time::sleep_until(deadline.at);
        tokio::pin!(expiry);

        self.spawn_page(&mut in_flight, 1);

        loop {
            if *cancel.borrow() {
                tracing::warn!(
                    outstanding = in_flight.len(),
                    "retrieval cancelled, aborting outstanding fetches"
                );
                return Err(SweepError::Cancelled);
            }

            tokio::select! {
                biased;

                changed = cancel.changed(), if watching => {
                    // sender は drop 済み。以後は値を見ない
                    if changed.is_err() {
                        watching = false;
                    }
                }

                _ = &mut expiry => {
                    tracing::warn!(
                        outstanding = in_flight.len(),
                        budget = ?deadline.budget,
                        "run deadline reached during retrieval"
                    );
                    return Err(SweepError::DeadlineExceeded(deadline.budget));
                }

                joined = in_flight.join_next() => {
                    let Some(joined) = joined else {
                        break;
                    };
                    let page = joined.map_err(|e| SweepError::TaskAborted(e.to_string()))??;

                    // 次ページを先に fork してからフィルタする
                    if let Some(next) = page.next() {
                        self.spawn_page(&mut in_flight, next);
                    }
                    retrieval.absorb(filter, page, self.clock.as_ref());
                }
            }
        }

        tracing::debug!(
            pages = retrieval.pages_fetched,
            evaluated = retrieval.evaluated,
            retained = retrieval.retained.len(),
            "retrieval drained"
        );
        Ok(retrieval)
    }

    fn spawn_page(&self, in_flight: &mut JoinSet<Result<Page, SweepError>>, page: u32) {
        let fetcher = Arc::clone(&self.fetcher);
        in_flight.spawn(async move { fetcher.fetch(page).await });
    }
}
