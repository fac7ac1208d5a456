use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::ListId;
use crate::model::word::WordEntry;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ListError {
    #[error("list name cannot be empty")]
    EmptyName,
}

//
// ─── LIST ──────────────────────────────────────────────────────────────────────
//

/// A named collection of vocabulary words, the unit of import and deletion.
///
/// The list owns its words; updates are whole-list write-backs through the
/// store, so there is no per-word identity beyond the position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    id: ListId,
    name: String,
    created_at: DateTime<Utc>,
    words: Vec<WordEntry>,
}

impl List {
    /// Create a list.
    ///
    /// # Errors
    ///
    /// Returns `ListError::EmptyName` if the trimmed name is empty.
    pub fn new(
        id: ListId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        words: Vec<WordEntry>,
    ) -> Result<Self, ListError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ListError::EmptyName);
        }

        Ok(Self {
            id,
            name,
            created_at,
            words,
        })
    }

    #[must_use]
    pub fn id(&self) -> ListId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    #[must_use]
    pub fn word_at(&self, index: usize) -> Option<&WordEntry> {
        self.words.get(index)
    }

    pub fn word_at_mut(&mut self, index: usize) -> Option<&mut WordEntry> {
        self.words.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Rename the list in place.
    ///
    /// # Errors
    ///
    /// Returns `ListError::EmptyName` if the trimmed name is empty.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ListError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ListError::EmptyName);
        }
        self.name = name;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn empty_name_is_rejected() {
        let err = List::new(ListId::new(1), "  ", fixed_now(), Vec::new()).unwrap_err();
        assert_eq!(err, ListError::EmptyName);
    }

    #[test]
    fn name_is_trimmed() {
        let list = List::new(ListId::new(1), " Animals ", fixed_now(), Vec::new()).unwrap();
        assert_eq!(list.name(), "Animals");
    }

    #[test]
    fn rename_validates() {
        let mut list = List::new(ListId::new(1), "Animals", fixed_now(), Vec::new()).unwrap();
        assert_eq!(list.rename(""), Err(ListError::EmptyName));
        list.rename("Beasts").unwrap();
        assert_eq!(list.name(), "Beasts");
    }
}
