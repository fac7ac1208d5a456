use crate::model::ids::ListId;
use crate::model::word::WordEntry;

//
// ─── SESSION-SCOPED TYPES ──────────────────────────────────────────────────────
//

/// Per-word progress within a single practice session.
///
/// Never persisted: the stored word only carries cumulative counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasteryState {
    /// Not yet missed this session.
    Fresh,
    /// Missed at least once; needs a streak of correct answers.
    Missed,
    /// Done for this session. Terminal.
    Mastered,
}

/// Quiz direction for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    /// The prompt (source term) is shown; a target-language answer is expected.
    /// Matching is exact, diacritics included.
    PromptIsSource,
    /// A target-language answer is shown; the source term is expected.
    /// Matching is case-insensitive.
    PromptIsTarget,
}

/// Where a session word came from, for routing stat write-backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSource {
    pub list_id: ListId,
    /// Position within the owning list's words at session start.
    pub index: usize,
}

/// Outcome of checking one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerCheck {
    pub is_correct: bool,
    /// Preferred display form of the expected answer.
    pub canonical_answer: String,
    pub mastery: MasteryState,
}

//
// ─── SESSION WORD ──────────────────────────────────────────────────────────────
//

/// An in-memory working copy of a [`WordEntry`] scoped to one session.
///
/// Counts accumulate on the copy and are committed back to the store after
/// each answer; mastery state and streak stay session-local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWord {
    entry: WordEntry,
    mastery: MasteryState,
    streak_since_miss: u32,
    source: Option<WordSource>,
}

/// Consecutive correct answers required to master a word after a miss.
const STREAK_TO_MASTER: u32 = 2;

impl SessionWord {
    #[must_use]
    pub fn new(entry: WordEntry, source: Option<WordSource>) -> Self {
        Self {
            entry,
            mastery: MasteryState::Fresh,
            streak_since_miss: 0,
            source,
        }
    }

    #[must_use]
    pub fn entry(&self) -> &WordEntry {
        &self.entry
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        self.entry.prompt()
    }

    #[must_use]
    pub fn mastery(&self) -> MasteryState {
        self.mastery
    }

    #[must_use]
    pub fn streak_since_miss(&self) -> u32 {
        self.streak_since_miss
    }

    #[must_use]
    pub fn source(&self) -> Option<WordSource> {
        self.source
    }

    #[must_use]
    pub fn is_mastered(&self) -> bool {
        self.mastery == MasteryState::Mastered
    }

    /// The text shown to the user as the question, depending on direction.
    #[must_use]
    pub fn shown_text(&self, mode: QuizMode) -> &str {
        match mode {
            QuizMode::PromptIsSource => self.entry.prompt(),
            QuizMode::PromptIsTarget => self.entry.canonical_answer(),
        }
    }

    /// Check an answer, update counts and mastery, and report the outcome.
    ///
    /// Mastered words are terminal: the check becomes a no-op that reports
    /// the current state without touching the counts.
    pub fn check_answer(&mut self, input: &str, mode: QuizMode) -> AnswerCheck {
        let canonical_answer = match mode {
            QuizMode::PromptIsSource => self.entry.canonical_answer().to_owned(),
            QuizMode::PromptIsTarget => self.entry.prompt().to_owned(),
        };

        if self.is_mastered() {
            return AnswerCheck {
                is_correct: false,
                canonical_answer,
                mastery: self.mastery,
            };
        }

        let is_correct = match mode {
            QuizMode::PromptIsSource => self.entry.matches_answer(input),
            QuizMode::PromptIsTarget => self.entry.matches_prompt(input),
        };

        if is_correct {
            self.entry.record_correct();
        } else {
            self.entry.record_incorrect();
        }
        self.apply_transition(is_correct);

        AnswerCheck {
            is_correct,
            canonical_answer,
            mastery: self.mastery,
        }
    }

    fn apply_transition(&mut self, is_correct: bool) {
        match (self.mastery, is_correct) {
            // A single correct answer suffices from the fresh state.
            (MasteryState::Fresh, true) => {
                self.mastery = MasteryState::Mastered;
            }
            (MasteryState::Fresh, false) => {
                self.mastery = MasteryState::Missed;
                self.streak_since_miss = 0;
            }
            (MasteryState::Missed, true) => {
                self.streak_since_miss += 1;
                if self.streak_since_miss >= STREAK_TO_MASTER {
                    self.mastery = MasteryState::Mastered;
                }
            }
            (MasteryState::Missed, false) => {
                self.streak_since_miss = 0;
            }
            (MasteryState::Mastered, _) => {}
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn session_word(prompt: &str, answers: &[&str]) -> SessionWord {
        let entry =
            WordEntry::new(prompt, answers.iter().map(ToString::to_string).collect()).unwrap();
        SessionWord::new(entry, None)
    }

    #[test]
    fn fresh_correct_masters_immediately() {
        let mut w = session_word("cat", &["חתול"]);
        let check = w.check_answer("חתול", QuizMode::PromptIsSource);
        assert!(check.is_correct);
        assert_eq!(check.mastery, MasteryState::Mastered);
        assert_eq!(w.entry().correct_count(), 1);
    }

    #[test]
    fn miss_then_streak_of_two_masters() {
        let mut w = session_word("cat", &["חתול"]);
        assert_eq!(
            w.check_answer("כלב", QuizMode::PromptIsSource).mastery,
            MasteryState::Missed
        );
        assert_eq!(
            w.check_answer("חתול", QuizMode::PromptIsSource).mastery,
            MasteryState::Missed
        );
        assert_eq!(w.streak_since_miss(), 1);
        assert_eq!(
            w.check_answer("חתול", QuizMode::PromptIsSource).mastery,
            MasteryState::Mastered
        );
    }

    #[test]
    fn streak_resets_on_miss() {
        let mut w = session_word("cat", &["חתול"]);
        w.check_answer("wrong", QuizMode::PromptIsSource);
        w.check_answer("חתול", QuizMode::PromptIsSource);
        assert_eq!(w.streak_since_miss(), 1);

        w.check_answer("wrong again", QuizMode::PromptIsSource);
        assert_eq!(w.streak_since_miss(), 0);
        assert_eq!(w.mastery(), MasteryState::Missed);

        // one correct after the reset is not enough
        let check = w.check_answer("חתול", QuizMode::PromptIsSource);
        assert_eq!(w.streak_since_miss(), 1);
        assert_eq!(check.mastery, MasteryState::Missed);
    }

    #[test]
    fn mastered_is_terminal() {
        let mut w = session_word("cat", &["חתול"]);
        w.check_answer("חתול", QuizMode::PromptIsSource);
        let counts = (w.entry().correct_count(), w.entry().incorrect_count());

        let check = w.check_answer("חתול", QuizMode::PromptIsSource);
        assert_eq!(check.mastery, MasteryState::Mastered);
        assert_eq!(
            (w.entry().correct_count(), w.entry().incorrect_count()),
            counts,
            "terminal state must not accumulate counts"
        );
    }

    #[test]
    fn reverse_mode_matches_prompt_case_insensitively() {
        let mut w = session_word("Cat", &["חתול"]);
        let check = w.check_answer("cat", QuizMode::PromptIsTarget);
        assert!(check.is_correct);
        assert_eq!(check.canonical_answer, "Cat");
    }

    #[test]
    fn canonical_answer_prefers_pointed_variant_regardless_of_input() {
        let mut w = session_word("hello", &["שלום", "שָׁלוֹם"]);
        let check = w.check_answer("שלום", QuizMode::PromptIsSource);
        assert!(check.is_correct);
        assert_eq!(check.canonical_answer, "שָׁלוֹם");
    }
}
