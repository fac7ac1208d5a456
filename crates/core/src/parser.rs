//! Line-oriented ingestion of vocabulary files.
//!
//! The format is `PROMPT=ANSWER1|ANSWER2|...`, one pair per line, with an
//! optional leading header marker and an optional `@` end marker. Malformed
//! lines are tolerated and skipped; the parser never fails.

use crate::model::WordEntry;

/// A line that trims to this token terminates parsing; the rest is ignored.
pub const END_MARKER: &str = "@";

/// Legacy list files start with this fixed header token on the first
/// non-blank line. It is skipped when present.
pub const HEADER_MARKER: &str = "###";

/// Separator between prompt and answers.
const PAIR_SEPARATOR: char = '=';

/// Separator between answer variants.
const ANSWER_SEPARATOR: char = '|';

/// Parse raw text into word entries.
///
/// Pure and deterministic. Returns an empty Vec when no line parses; the
/// caller decides whether that is a user-facing failure.
#[must_use]
pub fn parse(raw: &str) -> Vec<WordEntry> {
    let mut words = Vec::new();
    let mut seen_content = false;

    for line in raw.lines() {
        let line = line.trim();
        if line == END_MARKER {
            break;
        }
        if line.is_empty() {
            continue;
        }
        if !seen_content {
            seen_content = true;
            if line == HEADER_MARKER {
                continue;
            }
        }

        if let Some(word) = parse_line(line) {
            words.push(word);
        }
    }

    words
}

/// Parse one trimmed, non-blank line; `None` means the line is skipped.
fn parse_line(line: &str) -> Option<WordEntry> {
    // Exactly one separator: prompts and answers may not contain '='.
    if line.matches(PAIR_SEPARATOR).count() != 1 {
        return None;
    }

    let (prompt, answers) = line.split_once(PAIR_SEPARATOR)?;
    let answers: Vec<String> = answers
        .split(ANSWER_SEPARATOR)
        .map(|a| a.trim().to_owned())
        .filter(|a| !a.is_empty())
        .collect();

    WordEntry::new(prompt, answers).ok()
}

/// Render entries back to the line format accepted by [`parse`].
///
/// Round-trip property: `parse(to_text(&parse(raw)))` yields the same
/// entries for well-formed input (statistics are not part of the format).
#[must_use]
pub fn to_text(words: &[WordEntry]) -> String {
    let mut out = String::new();
    for word in words {
        out.push_str(word.prompt());
        out.push(PAIR_SEPARATOR);
        out.push_str(&word.accepted_answers().join("|"));
        out.push('\n');
    }
    out
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_pairs() {
        let words = parse("cat=חתול\ndog=כלב\n");
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].prompt(), "cat");
        assert_eq!(words[0].accepted_answers(), ["חתול"]);
        assert_eq!(words[1].prompt(), "dog");
    }

    #[test]
    fn end_marker_stops_parsing() {
        let words = parse("cat=חתול\ndog=כלב\n@\nignored=ignored");
        assert_eq!(words.len(), 2);
        assert!(words.iter().all(|w| w.prompt() != "ignored"));
    }

    #[test]
    fn leading_header_marker_is_skipped() {
        let words = parse("###\ncat=חתול\n");
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].prompt(), "cat");
    }

    #[test]
    fn header_marker_only_counts_on_first_content_line() {
        let words = parse("cat=חתול\n###\ndog=כלב\n");
        // the later "###" is just a malformed line
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn malformed_lines_are_skipped_silently() {
        let raw = "no separator here\n=missing prompt\ntwo=equals=signs\ncat=חתול\nblank answer=|  \n";
        let words = parse(raw);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].prompt(), "cat");
    }

    #[test]
    fn splits_answer_variants() {
        let words = parse("hello=שלום| שָׁלוֹם ");
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].accepted_answers(), ["שלום", "שָׁלוֹם"]);
    }

    #[test]
    fn empty_input_yields_empty_vec() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n@\n").is_empty());
    }

    #[test]
    fn round_trips_well_formed_input() {
        let first = parse("cat=חתול\nhello=שלום|שָׁלוֹם\ndog=כלב\n");
        let second = parse(&to_text(&first));
        assert_eq!(first, second);
    }
}
