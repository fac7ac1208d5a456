//! Full-database export/import.
//!
//! Import has replace semantics: the entire store is cleared, then the
//! snapshot's lists and progress records are inserted under their original
//! ids. Nothing is merged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use milim_core::model::{DailyProgressRecord, List, ListId, WordEntry};
use storage::repository::{ListRepository, ProgressRepository, WordRecord};

use crate::error::SnapshotError;

/// Persisted shape of one list within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSnapshot {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub words: Vec<WordRecord>,
}

impl ListSnapshot {
    #[must_use]
    pub fn from_list(list: &List) -> Self {
        Self {
            id: list.id().value(),
            name: list.name().to_owned(),
            created_at: list.created_at(),
            words: list.words().iter().map(WordRecord::from_entry).collect(),
        }
    }

    /// Convert the snapshot back into a domain `List`.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if any persisted word or the list name fails
    /// validation.
    pub fn into_list(self) -> Result<List, SnapshotError> {
        let mut words: Vec<WordEntry> = Vec::with_capacity(self.words.len());
        for record in self.words {
            words.push(record.into_entry()?);
        }
        Ok(List::new(
            ListId::new(self.id),
            self.name,
            self.created_at,
            words,
        )?)
    }
}

/// The entire store: all lists plus the daily progress history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub lists: Vec<ListSnapshot>,
    pub daily_progress: Vec<DailyProgressRecord>,
}

impl DatabaseSnapshot {
    /// Serialize to pretty JSON for file export.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Json` on serialization failure.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Json` on malformed input.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Exports and restores whole-database snapshots.
#[derive(Clone)]
pub struct SnapshotService {
    lists: Arc<dyn ListRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl SnapshotService {
    #[must_use]
    pub fn new(lists: Arc<dyn ListRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { lists, progress }
    }

    /// Capture the full store.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Storage` if any read fails.
    pub async fn export(&self) -> Result<DatabaseSnapshot, SnapshotError> {
        let lists = self
            .lists
            .all_lists()
            .await?
            .iter()
            .map(ListSnapshot::from_list)
            .collect();
        let daily_progress = self.progress.all_days().await?;
        Ok(DatabaseSnapshot {
            lists,
            daily_progress,
        })
    }

    /// Replace the entire store with the snapshot's contents.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if validation or any write fails. A failure
    /// mid-import leaves the store partially restored; re-running the import
    /// is the recovery path.
    pub async fn import(&self, snapshot: DatabaseSnapshot) -> Result<(), SnapshotError> {
        self.lists.clear_lists().await?;
        self.progress.clear_days().await?;

        let list_count = snapshot.lists.len();
        for list_snapshot in snapshot.lists {
            let list = list_snapshot.into_list()?;
            self.lists.upsert_list(&list).await?;
        }
        for day in &snapshot.daily_progress {
            self.progress.upsert_day(day).await?;
        }

        tracing::info!(lists = list_count, "snapshot imported");
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use milim_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, NewListRecord};

    async fn seed(repo: &InMemoryRepository) {
        let words = vec![
            WordEntry::new("cat", vec!["חתול".into()]).unwrap(),
            WordEntry::new("dog", vec!["כלב".into()]).unwrap(),
        ];
        repo.insert_new_list(NewListRecord::new("Animals", fixed_now(), &words))
            .await
            .unwrap();

        let mut day = DailyProgressRecord::empty(fixed_now().date_naive());
        day.record_session(2);
        repo.upsert_day(&day).await.unwrap();
    }

    fn service(repo: &InMemoryRepository) -> SnapshotService {
        SnapshotService::new(Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn export_captures_lists_and_progress() {
        let repo = InMemoryRepository::new();
        seed(&repo).await;

        let snapshot = service(&repo).export().await.unwrap();
        assert_eq!(snapshot.lists.len(), 1);
        assert_eq!(snapshot.lists[0].words.len(), 2);
        assert_eq!(snapshot.daily_progress.len(), 1);
    }

    #[tokio::test]
    async fn import_replaces_rather_than_merges() {
        let source = InMemoryRepository::new();
        seed(&source).await;
        let snapshot = service(&source).export().await.unwrap();

        let target = InMemoryRepository::new();
        let words = vec![WordEntry::new("stale", vec!["ישן".into()]).unwrap()];
        target
            .insert_new_list(NewListRecord::new("Stale", fixed_now(), &words))
            .await
            .unwrap();

        service(&target).import(snapshot).await.unwrap();

        let lists = target.all_lists().await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name(), "Animals");
        assert_eq!(target.all_days().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn json_round_trip_preserves_snapshot() {
        let repo = InMemoryRepository::new();
        seed(&repo).await;
        let snapshot = service(&repo).export().await.unwrap();

        let json = snapshot.to_json().unwrap();
        let parsed = DatabaseSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[tokio::test]
    async fn import_preserves_list_ids() {
        let source = InMemoryRepository::new();
        seed(&source).await;
        let snapshot = service(&source).export().await.unwrap();
        let original_id = snapshot.lists[0].id;

        let target = InMemoryRepository::new();
        service(&target).import(snapshot).await.unwrap();

        let restored = target
            .get_list(ListId::new(original_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.name(), "Animals");
    }
}
