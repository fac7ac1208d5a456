//! Builds practice subsets from the stored word pool.
//!
//! Two strategies: a whole list (shuffled), or the globally weakest N words
//! ranked by incorrect-answer ratio.

use std::cmp::Ordering;

use milim_core::model::{List, SessionWord, WordSource};
use rand::Rng;
use rand::seq::SliceRandom;

/// Default size of a weakest-words practice set.
pub const DEFAULT_WEAKEST_COUNT: usize = 20;

/// Ranking weight for words that were never attempted.
///
/// Strictly above the maximum attainable ratio of 1.0, so unseen words always
/// sort as the weakest.
const NEVER_ATTEMPTED_WEIGHT: f64 = 2.0;

/// Copy every word of the list into session form, shuffled uniformly.
///
/// Mastery starts `Fresh` with a zero streak; each word keeps a back
/// reference to its list and position for stat write-backs.
pub fn whole_list<R: Rng + ?Sized>(list: &List, rng: &mut R) -> Vec<SessionWord> {
    let mut words: Vec<SessionWord> = list
        .words()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            SessionWord::new(
                entry.clone(),
                Some(WordSource {
                    list_id: list.id(),
                    index,
                }),
            )
        })
        .collect();
    words.shuffle(rng);
    words
}

/// Pick the `n` globally weakest words across all lists.
///
/// Weakness is `incorrect / attempts`; never-attempted words rank weakest of
/// all. The sort is stable and descending, so ties keep the original
/// iteration order (list order, then word order within the list), which keeps
/// selection deterministic.
#[must_use]
pub fn weakest(lists: &[List], n: usize) -> Vec<SessionWord> {
    let mut pool: Vec<SessionWord> = lists
        .iter()
        .flat_map(|list| {
            list.words().iter().enumerate().map(|(index, entry)| {
                SessionWord::new(
                    entry.clone(),
                    Some(WordSource {
                        list_id: list.id(),
                        index,
                    }),
                )
            })
        })
        .collect();

    pool.sort_by(|a, b| {
        weight(b)
            .partial_cmp(&weight(a))
            .unwrap_or(Ordering::Equal)
    });
    pool.truncate(n);
    pool
}

fn weight(word: &SessionWord) -> f64 {
    word.entry()
        .weakness_score()
        .unwrap_or(NEVER_ATTEMPTED_WEIGHT)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
