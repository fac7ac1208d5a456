use std::sync::Arc;

use milim_core::model::DailyProgressRecord;
use storage::repository::ProgressRepository;

use crate::Clock;
use crate::error::ProgressServiceError;

/// Maintains the per-day completion aggregates.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    /// Fold one completed session into today's record, creating it on the
    /// first completion of the day.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the read or write fails.
    pub async fn record_completion(&self, words_mastered: u32) -> Result<(), ProgressServiceError> {
        let today = self.clock.today();
        let mut day = self
            .progress
            .get_day(today)
            .await?
            .unwrap_or_else(|| DailyProgressRecord::empty(today));

        day.record_session(words_mastered);
        self.progress.upsert_day(&day).await?;
        Ok(())
    }

    /// All daily records, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn history(&self) -> Result<Vec<DailyProgressRecord>, ProgressServiceError> {
        Ok(self.progress.all_days().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use milim_core::time::{Clock, fixed_now};
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn creates_then_increments_daily_record() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ProgressService::new(Clock::fixed(fixed_now()), repo.clone());

        service.record_completion(3).await.unwrap();
        service.record_completion(2).await.unwrap();

        let history = service.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sessions_completed, 2);
        assert_eq!(history[0].words_mastered, 5);
    }

    #[tokio::test]
    async fn separate_days_get_separate_records() {
        let repo = Arc::new(InMemoryRepository::new());

        let day_one = ProgressService::new(Clock::fixed(fixed_now()), repo.clone());
        day_one.record_completion(1).await.unwrap();

        let day_two =
            ProgressService::new(Clock::fixed(fixed_now() + Duration::days(1)), repo.clone());
        day_two.record_completion(4).await.unwrap();

        let history = day_two.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].words_mastered, 1);
        assert_eq!(history[1].words_mastered, 4);
    }
}
