use std::sync::Arc;

use milim_core::model::{AnswerCheck, ListId, QuizMode};
use storage::repository::{ListRepository, ProgressRepository, StorageError};

use super::service::SessionService;
use crate::Clock;
use crate::error::SessionError;
use crate::progress_service::ProgressService;
use crate::selection;

/// Result of advancing the session cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAdvance {
    pub is_complete: bool,
    /// Question text for the next word, when the session continues.
    pub next_shown: Option<String>,
}

/// Orchestrates session start and persisted answering.
///
/// One store write per answered word; failures are surfaced once and not
/// retried, leaving prior state unchanged.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    lists: Arc<dyn ListRepository>,
    progress: ProgressService,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lists: Arc<dyn ListRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            lists,
            progress: ProgressService::new(clock, progress),
        }
    }

    /// Start a session over every word of one list, shuffled.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the list cannot be read and
    /// `SessionError::Empty` when it has no words.
    pub async fn start_list_session(
        &self,
        list_id: ListId,
        mode: QuizMode,
    ) -> Result<SessionService, SessionError> {
        let list = self
            .lists
            .get_list(list_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        let words = selection::whole_list(&list, &mut rand::rng());
        tracing::debug!(list_id = %list_id, words = words.len(), "starting whole-list session");
        SessionService::new(words, mode, self.clock.now())
    }

    /// Start a session over the `n` globally weakest words.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when no words exist in any list.
    pub async fn start_weakest_session(
        &self,
        n: usize,
        mode: QuizMode,
    ) -> Result<SessionService, SessionError> {
        let lists = self.lists.all_lists().await?;
        let words = selection::weakest(&lists, n);
        tracing::debug!(requested = n, words = words.len(), "starting weakest-words session");
        SessionService::new(words, mode, self.clock.now())
    }

    /// Check the answer for the current word and commit its updated counts to
    /// the owning list (full-list write-back). Mastery state stays in memory.
    ///
    /// # Errors
    ///
    /// Propagates `check_answer` protocol errors and storage failures; a
    /// failed write is surfaced once, not retried.
    pub async fn answer_current(
        &self,
        session: &mut SessionService,
        input: &str,
    ) -> Result<AnswerCheck, SessionError> {
        let check = session.check_answer(input)?;

        let Some(word) = session.current_word() else {
            return Err(SessionError::NoActiveWord);
        };
        if let Some(source) = word.source() {
            let correct = word.entry().correct_count();
            let incorrect = word.entry().incorrect_count();

            let mut list = self
                .lists
                .get_list(source.list_id)
                .await?
                .ok_or(StorageError::NotFound)?;
            let entry = list
                .word_at_mut(source.index)
                .ok_or(StorageError::NotFound)?;
            entry.set_counts(correct, incorrect);
            self.lists.update_list(&list).await?;
        }

        tracing::debug!(
            prompt = word.prompt(),
            correct = check.is_correct,
            mastery = ?check.mastery,
            "answer checked"
        );
        Ok(check)
    }

    /// Advance to the next unmastered word; on completion, fold the session
    /// into the daily progress records (at most once per session).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if recording progress fails; the
    /// session stays complete and the recording can be retried by calling
    /// `advance` (or `finalize_progress`) again.
    pub async fn advance(&self, session: &mut SessionService) -> Result<SessionAdvance, SessionError> {
        let is_complete = session.advance(&mut rand::rng(), self.clock.now());

        if is_complete {
            self.finalize_progress(session).await?;
        }

        Ok(SessionAdvance {
            is_complete,
            next_shown: session
                .current_word()
                .map(|w| w.shown_text(session.mode()).to_owned()),
        })
    }

    /// Record the completed session in the daily progress aggregate.
    ///
    /// Guarded by the session's `progress_recorded` flag, so repeated
    /// completion observations record at most once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persistence fails; the flag is only
    /// set after a successful write, so a retry is safe.
    pub async fn finalize_progress(&self, session: &mut SessionService) -> Result<(), SessionError> {
        if !session.is_complete() || session.progress_recorded() {
            return Ok(());
        }

        let mastered = u32::try_from(session.mastered_count()).unwrap_or(u32::MAX);
        self.progress
            .record_completion(mastered)
            .await
            .map_err(|e| match e {
                crate::error::ProgressServiceError::Storage(s) => SessionError::Storage(s),
            })?;
        session.mark_progress_recorded();
        tracing::info!(mastered, "session complete, progress recorded");
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
