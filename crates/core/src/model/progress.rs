use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily aggregate of completed practice, one record per calendar day.
///
/// Created on the first completion of a day and incremented thereafter.
/// Only a full snapshot import removes records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgressRecord {
    pub date: NaiveDate,
    pub sessions_completed: u32,
    pub words_mastered: u32,
}

impl DailyProgressRecord {
    /// A zeroed record for the given day.
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sessions_completed: 0,
            words_mastered: 0,
        }
    }

    /// Fold one completed session into the day.
    pub fn record_session(&mut self, words_mastered: u32) {
        self.sessions_completed = self.sessions_completed.saturating_add(1);
        self.words_mastered = self.words_mastered.saturating_add(words_mastered);
    }
}
