use std::sync::Arc;

use milim_core::model::{List, ListId};
use milim_core::parser;
use storage::repository::{ListRepository, NewListRecord, StorageError};

use crate::Clock;
use crate::error::ListServiceError;

/// Orchestrates list import, lookup, and lifecycle.
#[derive(Clone)]
pub struct ListService {
    clock: Clock,
    lists: Arc<dyn ListRepository>,
}

impl ListService {
    #[must_use]
    pub fn new(clock: Clock, lists: Arc<dyn ListRepository>) -> Self {
        Self { clock, lists }
    }

    /// Parse raw vocabulary text and persist it as a new list.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::EmptyInput` when no line parses to a word.
    /// Returns `ListServiceError::Storage` if persistence fails.
    pub async fn import_text(
        &self,
        name: impl Into<String>,
        raw: &str,
    ) -> Result<ListId, ListServiceError> {
        let words = parser::parse(raw);
        if words.is_empty() {
            return Err(ListServiceError::EmptyInput);
        }

        let name = name.into();
        let record = NewListRecord::new(&name, self.clock.now(), &words);
        let id = self.lists.insert_new_list(record).await?;
        tracing::info!(list = %name, id = %id, words = words.len(), "imported list");
        Ok(id)
    }

    /// All lists sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::Storage` if repository access fails.
    pub async fn lists(&self) -> Result<Vec<List>, ListServiceError> {
        Ok(self.lists.all_lists().await?)
    }

    /// Fetch a list by id. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::Storage` if repository access fails.
    pub async fn get(&self, id: ListId) -> Result<Option<List>, ListServiceError> {
        Ok(self.lists.get_list(id).await?)
    }

    /// Rename a list, keeping its words and statistics.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::List` if the new name fails validation.
    /// Returns `ListServiceError::Storage` if the list is missing or the
    /// write fails.
    pub async fn rename(&self, id: ListId, name: impl Into<String>) -> Result<(), ListServiceError> {
        let mut list = self
            .lists
            .get_list(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        list.rename(name)?;
        self.lists.update_list(&list).await?;
        Ok(())
    }

    /// Delete a list and all its words.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::Storage` if the list is missing or the
    /// delete fails.
    pub async fn delete(&self, id: ListId) -> Result<(), ListServiceError> {
        self.lists.delete_list(id).await?;
        tracing::info!(id = %id, "deleted list");
        Ok(())
    }

    /// Render a list back to the ingestion text format.
    #[must_use]
    pub fn render_text(list: &List) -> String {
        parser::to_text(list.words())
    }
}
