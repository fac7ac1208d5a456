use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("word prompt cannot be empty")]
    EmptyPrompt,

    #[error("word must have at least one accepted answer")]
    NoAcceptedAnswers,
}

//
// ─── WORD ENTRY ────────────────────────────────────────────────────────────────
//

/// A persisted vocabulary pair with cumulative answer statistics.
///
/// The prompt is the source-language term; `accepted_answers` holds one or
/// more target-language variants, the first being canonical by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    prompt: String,
    accepted_answers: Vec<String>,
    correct_count: u32,
    incorrect_count: u32,
}

impl WordEntry {
    /// Create a fresh entry with zeroed counts.
    ///
    /// # Errors
    ///
    /// Returns `WordError::EmptyPrompt` if the trimmed prompt is empty.
    /// Returns `WordError::NoAcceptedAnswers` if no non-empty answer remains.
    pub fn new(
        prompt: impl Into<String>,
        accepted_answers: Vec<String>,
    ) -> Result<Self, WordError> {
        Self::from_persisted(prompt, accepted_answers, 0, 0)
    }

    /// Rehydrate an entry from persisted storage.
    ///
    /// # Errors
    ///
    /// Same validation as [`WordEntry::new`].
    pub fn from_persisted(
        prompt: impl Into<String>,
        accepted_answers: Vec<String>,
        correct_count: u32,
        incorrect_count: u32,
    ) -> Result<Self, WordError> {
        let prompt = prompt.into().trim().to_owned();
        if prompt.is_empty() {
            return Err(WordError::EmptyPrompt);
        }

        let accepted_answers: Vec<String> = accepted_answers
            .into_iter()
            .map(|a| a.trim().to_owned())
            .filter(|a| !a.is_empty())
            .collect();
        if accepted_answers.is_empty() {
            return Err(WordError::NoAcceptedAnswers);
        }

        Ok(Self {
            prompt,
            accepted_answers,
            correct_count,
            incorrect_count,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn accepted_answers(&self) -> &[String] {
        &self.accepted_answers
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }

    /// Total number of recorded attempts.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.correct_count + self.incorrect_count
    }

    /// Fraction of attempts answered incorrectly, or `None` when never attempted.
    ///
    /// Never-attempted words rank as the weakest of all during selection.
    #[must_use]
    pub fn weakness_score(&self) -> Option<f64> {
        let attempts = self.attempts();
        if attempts == 0 {
            None
        } else {
            Some(f64::from(self.incorrect_count) / f64::from(attempts))
        }
    }

    /// The preferred display form of the answer.
    ///
    /// When several variants exist, a variant carrying Hebrew diacritical
    /// marks wins so the user sees the fully pointed spelling; otherwise the
    /// first variant is canonical.
    #[must_use]
    pub fn canonical_answer(&self) -> &str {
        self.accepted_answers
            .iter()
            .find(|a| has_hebrew_points(a))
            .unwrap_or(&self.accepted_answers[0])
    }

    /// Whether the input matches any accepted answer byte-for-byte.
    ///
    /// Exact comparison on purpose: Hebrew diacritics are meaningful.
    #[must_use]
    pub fn matches_answer(&self, input: &str) -> bool {
        self.accepted_answers.iter().any(|a| a == input)
    }

    /// Whether the input matches the prompt, ignoring case.
    ///
    /// Used in the reverse quiz direction where the source term is expected.
    #[must_use]
    pub fn matches_prompt(&self, input: &str) -> bool {
        input.to_lowercase() == self.prompt.to_lowercase()
    }

    pub fn record_correct(&mut self) {
        self.correct_count = self.correct_count.saturating_add(1);
    }

    pub fn record_incorrect(&mut self) {
        self.incorrect_count = self.incorrect_count.saturating_add(1);
    }

    /// Overwrite the cumulative counts, e.g. when committing a session copy
    /// back to the stored entry.
    pub fn set_counts(&mut self, correct_count: u32, incorrect_count: u32) {
        self.correct_count = correct_count;
        self.incorrect_count = incorrect_count;
    }
}

/// True when the string carries Hebrew points or cantillation (U+0591..=U+05C7).
fn has_hebrew_points(s: &str) -> bool {
    s.chars().any(|c| matches!(c, '\u{0591}'..='\u{05C7}'))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
