//! Sweeper - 1 回の実行（検証 → 取得 → 削除）
//!
//! # フロー
//! 1. owner / repo を検証（ネットワーク前）
//! 2. FilterCriteria をコンパイル（strict なら問題があれば終了）
//! 3. Collector でページを fan-out 取得しつつフィルタ
//! 4. Deleter で削除（dry run なら報告のみ）

use std::sync::Arc;

use tokio::sync::watch;

use crate::app::collector::Collector;
use crate::app::config::{RunDeadline, SweepConfig};
use crate::app::deleter::Deleter;
use crate::app::fetcher::{PageFetcher, SweepTarget};
use crate::domain::{Filter, FilterCriteria, RepoRef, RunId, SweepError, SweepReport};
use crate::ports::{ArtifactRepository, Clock};

/// Input of one run.
#[derive(Debug, Clone, Default)]
pub struct SweepRequest {
    pub owner: String,
    pub repo: String,
    pub run_id: Option<RunId>,
    pub criteria: FilterCriteria,
    pub dry_run: bool,
}

/// Runs sweeps against one [`ArtifactRepository`]. Built by
/// [`SweeperBuilder`](crate::app::SweeperBuilder).
pub struct Sweeper {
    pub(crate) repository: Arc<dyn ArtifactRepository>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: SweepConfig,
}

impl Sweeper {
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Execute one run.
    ///
    /// Sending `true` on the channel behind `cancel` stops the run with
    /// [`SweepError::Cancelled`]. Dropping the sender has no effect.
    pub async fn run(
        &self,
        request: SweepRequest,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<SweepReport, SweepError> {
        let repo = RepoRef::new(request.owner, request.repo)?;
        tracing::info!(
            owner = repo.owner(),
            repo = repo.repo(),
            "delete-artifacts is checking the repo"
        );

        let filter = Filter::compile(&request.criteria);
        if self.config.strict_filters
            && let Some(problem) = filter.problems().first()
        {
            return Err(problem.clone().into());
        }
        filter.report_problems();

        let deadline = RunDeadline::starting_now(self.config.run_timeout);
        let target = SweepTarget {
            repo: repo.clone(),
            run_id: request.run_id,
        };
        let fetcher = PageFetcher::new(
            Arc::clone(&self.repository),
            target,
            self.config.page_size,
            self.config.page_timeout,
        );
        let collector = Collector::new(Arc::new(fetcher), Arc::clone(&self.clock));

        let retrieval = collector.collect(&filter, deadline, &mut cancel).await?;
        tracing::debug!(
            count = retrieval.retained.len(),
            "found the set of artifacts slated for deletion"
        );

        let pages_fetched = retrieval.pages_fetched;
        let evaluated = retrieval.evaluated;
        let retained = retrieval.retained.len();

        let deleter = Deleter::new(Arc::clone(&self.repository), repo);
        let outcomes = deleter
            .apply(retrieval.retained, request.dry_run, deadline, &cancel)
            .await?;

        Ok(SweepReport {
            dry_run: request.dry_run,
            pages_fetched,
            evaluated,
            retained,
            outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use crate::app::SweeperBuilder;
    use crate::domain::{Artifact, ArtifactId, FilterConfigError};
    use crate::impls::InMemoryArtifactRepository;
    use crate::ports::FixedClock;

    fn artifacts() -> Vec<Artifact> {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        [("a.bin", 100), ("b.txt", 100), ("c.bin", 10)]
            .into_iter()
            .zip(1..)
            .map(|((name, size), id)| Artifact::new(ArtifactId::new(id), name, size, created))
            .collect()
    }

    fn sweeper(repo: Arc<InMemoryArtifactRepository>, strict: bool) -> Sweeper {
        SweeperBuilder::new()
            .repository(repo)
            .clock(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()))
            .run_timeout(Duration::from_secs(5))
            .strict_filters(strict)
            .build()
            .unwrap()
    }

    fn request(criteria: FilterCriteria) -> SweepRequest {
        SweepRequest {
            owner: "owner".into(),
            repo: "repo".into(),
            criteria,
            ..SweepRequest::default()
        }
    }

    #[tokio::test]
    async fn invalid_owner_makes_no_calls() {
        let repo = Arc::new(InMemoryArtifactRepository::with_artifacts(artifacts()));
        let (_tx, rx) = watch::channel(false);
        let req = SweepRequest {
            owner: "o".into(),
            ..request(FilterCriteria::new())
        };

        let err = sweeper(repo.clone(), false).run(req, rx).await.unwrap_err();

        assert!(matches!(err, SweepError::InvalidOwner(_)));
        assert_eq!(repo.list_calls(), 0);
    }

    #[tokio::test]
    async fn deletes_what_the_filter_keeps() {
        let repo = Arc::new(InMemoryArtifactRepository::with_artifacts(artifacts()));
        let (_tx, rx) = watch::channel(false);
        let criteria = FilterCriteria::new()
            .with_min_bytes(50)
            .with_name_pattern(Some(r"\.bin$"));

        let report = sweeper(repo.clone(), false)
            .run(request(criteria), rx)
            .await
            .unwrap();

        assert_eq!(report.evaluated, 3);
        assert_eq!(report.retained, 1);
        assert_eq!(report.deleted(), 1);
        assert_eq!(report.outcomes[0].artifact.name, "a.bin");
        assert_eq!(repo.remaining().await.len(), 2);
    }

    #[tokio::test]
    async fn broken_pattern_fails_closed_by_default() {
        let repo = Arc::new(InMemoryArtifactRepository::with_artifacts(artifacts()));
        let (_tx, rx) = watch::channel(false);
        let criteria = FilterCriteria::new().with_name_pattern(Some("(unclosed"));

        let report = sweeper(repo.clone(), false)
            .run(request(criteria), rx)
            .await
            .unwrap();

        assert_eq!(report.retained, 0);
        assert_eq!(repo.delete_calls(), 0);
    }

    #[tokio::test]
    async fn strict_mode_rejects_broken_pattern_up_front() {
        let repo = Arc::new(InMemoryArtifactRepository::with_artifacts(artifacts()));
        let (_tx, rx) = watch::channel(false);
        let criteria = FilterCriteria::new().with_name_pattern(Some("(unclosed"));

        let err = sweeper(repo.clone(), true)
            .run(request(criteria), rx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SweepError::FilterConfig(FilterConfigError::InvalidPattern { .. })
        ));
        assert_eq!(repo.list_calls(), 0);
    }
}
