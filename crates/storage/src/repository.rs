use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use milim_core::model::{DailyProgressRecord, List, ListId, WordEntry, WordError};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for one word within a list.
///
/// This mirrors the domain `WordEntry` so repositories and snapshots can
/// serialize without leaking storage concerns into the domain layer. Only
/// cumulative counts are persisted; mastery state never is.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WordRecord {
    pub prompt: String,
    pub accepted_answers: Vec<String>,
    pub correct_count: u32,
    pub incorrect_count: u32,
}

impl WordRecord {
    #[must_use]
    pub fn from_entry(entry: &WordEntry) -> Self {
        Self {
            prompt: entry.prompt().to_owned(),
            accepted_answers: entry.accepted_answers().to_vec(),
            correct_count: entry.correct_count(),
            incorrect_count: entry.incorrect_count(),
        }
    }

    /// Convert the record back into a domain `WordEntry`.
    ///
    /// # Errors
    ///
    /// Returns `WordError` if the persisted prompt or answers fail validation.
    pub fn into_entry(self) -> Result<WordEntry, WordError> {
        WordEntry::from_persisted(
            self.prompt,
            self.accepted_answers,
            self.correct_count,
            self.incorrect_count,
        )
    }
}

/// Payload for inserting a list whose id the store will assign.
#[derive(Debug, Clone)]
pub struct NewListRecord {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub words: Vec<WordRecord>,
}

impl NewListRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>, words: &[WordEntry]) -> Self {
        Self {
            name: name.into(),
            created_at,
            words: words.iter().map(WordRecord::from_entry).collect(),
        }
    }
}

/// Repository contract for word lists.
///
/// All operations are single-attempt; callers surface failures without retry.
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Insert a new list; the store assigns and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be stored.
    async fn insert_new_list(&self, list: NewListRecord) -> Result<ListId, StorageError>;

    /// Fetch a list with its words. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn get_list(&self, id: ListId) -> Result<Option<List>, StorageError>;

    /// All lists with their words, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn all_lists(&self) -> Result<Vec<List>, StorageError>;

    /// Full-replace write-back of name and words.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the list does not exist.
    async fn update_list(&self, list: &List) -> Result<(), StorageError>;

    /// Insert or replace a list under its existing id (snapshot import path).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be stored.
    async fn upsert_list(&self, list: &List) -> Result<(), StorageError>;

    /// Delete a list and its words.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the list does not exist.
    async fn delete_list(&self, id: ListId) -> Result<(), StorageError>;

    /// Remove every list. Used by snapshot import.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn clear_lists(&self) -> Result<(), StorageError>;
}

/// Repository contract for daily progress aggregates.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the record for one calendar day. `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn get_day(&self, date: NaiveDate) -> Result<Option<DailyProgressRecord>, StorageError>;

    /// Insert or replace the record for its day.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn upsert_day(&self, record: &DailyProgressRecord) -> Result<(), StorageError>;

    /// All records sorted by date.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn all_days(&self) -> Result<Vec<DailyProgressRecord>, StorageError>;

    /// Remove every record. Used by snapshot import.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn clear_days(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    lists: Arc<Mutex<BTreeMap<u64, List>>>,
    days: Arc<Mutex<BTreeMap<NaiveDate, DailyProgressRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListRepository for InMemoryRepository {
    async fn insert_new_list(&self, list: NewListRecord) -> Result<ListId, StorageError> {
        let mut guard = self
            .lists
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = guard.keys().next_back().map_or(1, |last| last + 1);

        let mut words = Vec::with_capacity(list.words.len());
        for record in list.words {
            words.push(
                record
                    .into_entry()
                    .map_err(|e| StorageError::Serialization(e.to_string()))?,
            );
        }
        let list = List::new(ListId::new(id), list.name, list.created_at, words)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        guard.insert(id, list);
        Ok(ListId::new(id))
    }

    async fn get_list(&self, id: ListId) -> Result<Option<List>, StorageError> {
        let guard = self
            .lists
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id.value()).cloned())
    }

    async fn all_lists(&self) -> Result<Vec<List>, StorageError> {
        let guard = self
            .lists
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut lists: Vec<List> = guard.values().cloned().collect();
        lists.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(lists)
    }

    async fn update_list(&self, list: &List) -> Result<(), StorageError> {
        let mut guard = self
            .lists
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if !guard.contains_key(&list.id().value()) {
            return Err(StorageError::NotFound);
        }
        guard.insert(list.id().value(), list.clone());
        Ok(())
    }

    async fn upsert_list(&self, list: &List) -> Result<(), StorageError> {
        let mut guard = self
            .lists
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(list.id().value(), list.clone());
        Ok(())
    }

    async fn delete_list(&self, id: ListId) -> Result<(), StorageError> {
        let mut guard = self
            .lists
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id.value()).ok_or(StorageError::NotFound)?;
        Ok(())
    }

    async fn clear_lists(&self) -> Result<(), StorageError> {
        let mut guard = self
            .lists
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_day(&self, date: NaiveDate) -> Result<Option<DailyProgressRecord>, StorageError> {
        let guard = self
            .days
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&date).cloned())
    }

    async fn upsert_day(&self, record: &DailyProgressRecord) -> Result<(), StorageError> {
        let mut guard = self
            .days
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.date, record.clone());
        Ok(())
    }

    async fn all_days(&self) -> Result<Vec<DailyProgressRecord>, StorageError> {
        let guard = self
            .days
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    async fn clear_days(&self) -> Result<(), StorageError> {
        let mut guard = self
            .days
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub lists: Arc<dyn ListRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let lists: Arc<dyn ListRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { lists, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milim_core::time::fixed_now;

    fn record(name: &str, prompts: &[&str]) -> NewListRecord {
        let words: Vec<WordEntry> = prompts
            .iter()
            .map(|p| WordEntry::new(*p, vec![format!("{p}-he")]).unwrap())
            .collect();
        NewListRecord::new(name, fixed_now(), &words)
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_new_list(record("A", &["cat"])).await.unwrap();
        let second = repo.insert_new_list(record("B", &["dog"])).await.unwrap();
        assert_ne!(first, second);
        assert!(repo.get_list(first).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn all_lists_sorts_by_name() {
        let repo = InMemoryRepository::new();
        repo.insert_new_list(record("Verbs", &["run"])).await.unwrap();
        repo.insert_new_list(record("Animals", &["cat"])).await.unwrap();

        let names: Vec<String> = repo
            .all_lists()
            .await
            .unwrap()
            .iter()
            .map(|l| l.name().to_owned())
            .collect();
        assert_eq!(names, ["Animals", "Verbs"]);
    }

    #[tokio::test]
    async fn update_requires_existing_list() {
        let repo = InMemoryRepository::new();
        let list = List::new(ListId::new(7), "Ghost", fixed_now(), Vec::new()).unwrap();
        assert!(matches!(
            repo.update_list(&list).await.unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[tokio::test]
    async fn update_replaces_word_counts() {
        let repo = InMemoryRepository::new();
        let id = repo.insert_new_list(record("Animals", &["cat"])).await.unwrap();

        let mut list = repo.get_list(id).await.unwrap().unwrap();
        list.word_at_mut(0).unwrap().record_correct();
        repo.update_list(&list).await.unwrap();

        let reloaded = repo.get_list(id).await.unwrap().unwrap();
        assert_eq!(reloaded.word_at(0).unwrap().correct_count(), 1);
    }

    #[tokio::test]
    async fn delete_then_get_is_none() {
        let repo = InMemoryRepository::new();
        let id = repo.insert_new_list(record("Animals", &["cat"])).await.unwrap();
        repo.delete_list(id).await.unwrap();
        assert!(repo.get_list(id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_list(id).await.unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[tokio::test]
    async fn progress_upsert_and_list_by_date() {
        let repo = InMemoryRepository::new();
        let today = fixed_now().date_naive();
        let mut day = DailyProgressRecord::empty(today);
        day.record_session(4);
        repo.upsert_day(&day).await.unwrap();

        let fetched = repo.get_day(today).await.unwrap().unwrap();
        assert_eq!(fetched.words_mastered, 4);
        assert_eq!(repo.all_days().await.unwrap().len(), 1);
    }
}
