use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;

use milim_core::model::{AnswerCheck, QuizMode, SessionWord};

use super::progress::SessionProgress;
use crate::error::SessionError;

/// In-memory state machine for one practice run.
///
/// Owns the session words, the cursor, and the answer/advance protocol:
/// the current word is answered exactly once, then `advance` re-samples the
/// next word uniformly among all words not yet mastered. The session is
/// complete when that pool is empty.
pub struct SessionService {
    words: Vec<SessionWord>,
    mode: QuizMode,
    current: Option<usize>,
    answered_current: bool,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    progress_recorded: bool,
}

impl SessionService {
    /// Create a session over a pre-selected word set.
    ///
    /// The cursor starts at the first word; nothing is answered yet.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no words are provided.
    pub fn new(
        words: Vec<SessionWord>,
        mode: QuizMode,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if words.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            words,
            mode,
            current: Some(0),
            answered_current: false,
            started_at,
            completed_at: None,
            progress_recorded: false,
        })
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn words(&self) -> &[SessionWord] {
        &self.words
    }

    /// Total number of words in this session.
    #[must_use]
    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    /// Number of words mastered so far.
    #[must_use]
    pub fn mastered_count(&self) -> usize {
        self.words.iter().filter(|w| w.is_mastered()).count()
    }

    /// Number of words still to master.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.words.len() - self.mastered_count()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_words(),
            mastered: self.mastered_count(),
            remaining: self.remaining(),
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn current_word(&self) -> Option<&SessionWord> {
        self.current.and_then(|i| self.words.get(i))
    }

    /// Check the user's answer against the current word.
    ///
    /// Updates the word's cumulative counts and mastery state. The caller is
    /// responsible for committing the counts back to the store.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveWord` if the session is complete or was
    /// never positioned on a word.
    /// Returns `SessionError::AlreadyAnswered` if the current word was
    /// already answered and `advance` has not been called yet.
    pub fn check_answer(&mut self, input: &str) -> Result<AnswerCheck, SessionError> {
        let Some(index) = self.current else {
            return Err(SessionError::NoActiveWord);
        };
        if self.answered_current {
            return Err(SessionError::AlreadyAnswered);
        }

        let word = self
            .words
            .get_mut(index)
            .ok_or(SessionError::NoActiveWord)?;
        let check = word.check_answer(input.trim(), self.mode);
        self.answered_current = true;
        Ok(check)
    }

    /// Move the cursor to the next word, sampled uniformly among all words
    /// not yet mastered. Every call re-samples the remaining pool, so a word
    /// answered incorrectly may come up again immediately.
    ///
    /// Returns `true` once no unmastered words remain; the completion
    /// timestamp is set on the first such call and the cursor clears, so any
    /// further `check_answer` fails with `NoActiveWord`.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> bool {
        self.answered_current = false;

        let remaining: Vec<usize> = self
            .words
            .iter()
            .enumerate()
            .filter(|(_, w)| !w.is_mastered())
            .map(|(i, _)| i)
            .collect();

        match remaining.choose(rng) {
            Some(&next) => {
                self.current = Some(next);
                false
            }
            None => {
                self.current = None;
                if self.completed_at.is_none() {
                    self.completed_at = Some(now);
                }
                true
            }
        }
    }

    /// Whether this session's completion has already been folded into the
    /// daily progress records.
    #[must_use]
    pub fn progress_recorded(&self) -> bool {
        self.progress_recorded
    }

    pub(crate) fn mark_progress_recorded(&mut self) {
        self.progress_recorded = true;
    }
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("words_len", &self.words.len())
            .field("mode", &self.mode)
            .field("current", &self.current)
            .field("answered_current", &self.answered_current)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use milim_core::model::{MasteryState, WordEntry};
    use milim_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session_word(prompt: &str, answer: &str) -> SessionWord {
        SessionWord::new(WordEntry::new(prompt, vec![answer.into()]).unwrap(), None)
    }

    fn three_word_session() -> SessionService {
        let words = vec![
            session_word("cat", "חתול"),
            session_word("dog", "כלב"),
            session_word("house", "בית"),
        ];
        SessionService::new(words, QuizMode::PromptIsSource, fixed_now()).unwrap()
    }

    /// Answer whatever word the cursor is on, correctly.
    fn answer_current_correctly(session: &mut SessionService) {
        let answer = session
            .current_word()
            .unwrap()
            .entry()
            .canonical_answer()
            .to_owned();
        let check = session.check_answer(&answer).unwrap();
        assert!(check.is_correct);
    }

    #[test]
    fn empty_session_returns_error() {
        let err =
            SessionService::new(Vec::new(), QuizMode::PromptIsSource, fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn starts_on_first_word_unanswered() {
        let session = three_word_session();
        assert_eq!(session.current_word().unwrap().prompt(), "cat");
        assert!(!session.is_complete());
        assert_eq!(session.progress().remaining, 3);
    }

    #[test]
    fn double_answer_before_advance_is_rejected() {
        let mut session = three_word_session();
        session.check_answer("חתול").unwrap();
        assert!(matches!(
            session.check_answer("חתול").unwrap_err(),
            SessionError::AlreadyAnswered
        ));
    }

    #[test]
    fn advance_only_picks_unmastered_words() {
        let mut session = three_word_session();
        let mut rng = StdRng::seed_from_u64(3);

        answer_current_correctly(&mut session);
        for _ in 0..50 {
            let complete = session.advance(&mut rng, fixed_now());
            if complete {
                break;
            }
            let word = session.current_word().unwrap();
            assert_ne!(word.mastery(), MasteryState::Mastered);
            answer_current_correctly(&mut session);
        }
        assert!(session.is_complete());
        assert_eq!(session.mastered_count(), 3);
    }

    #[test]
    fn completion_clears_cursor_and_blocks_checks() {
        let mut session = three_word_session();
        let mut rng = StdRng::seed_from_u64(9);

        while !session.is_complete() {
            answer_current_correctly(&mut session);
            session.advance(&mut rng, fixed_now());
        }

        assert!(session.current_word().is_none());
        assert!(matches!(
            session.check_answer("anything").unwrap_err(),
            SessionError::NoActiveWord
        ));
        assert_eq!(session.completed_at(), Some(fixed_now()));
    }

    #[test]
    fn repeated_advance_after_completion_stays_complete() {
        let mut session = three_word_session();
        let mut rng = StdRng::seed_from_u64(11);

        while !session.is_complete() {
            answer_current_correctly(&mut session);
            session.advance(&mut rng, fixed_now());
        }
        let completed_at = session.completed_at();

        assert!(session.advance(&mut rng, fixed_now()));
        assert_eq!(session.completed_at(), completed_at);
    }

    #[test]
    fn missed_word_stays_in_rotation_until_streak() {
        let words = vec![session_word("cat", "חתול")];
        let mut session = SessionService::new(words, QuizMode::PromptIsSource, fixed_now()).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        session.check_answer("wrong").unwrap();
        assert!(!session.advance(&mut rng, fixed_now()));

        session.check_answer("חתול").unwrap();
        assert!(!session.advance(&mut rng, fixed_now()), "streak of 1 is not mastery");

        session.check_answer("חתול").unwrap();
        assert!(session.advance(&mut rng, fixed_now()));
    }

    #[test]
    fn input_is_trimmed_before_matching() {
        let mut session = three_word_session();
        let check = session.check_answer("  חתול ").unwrap();
        assert!(check.is_correct);
    }
}
