use milim_core::model::{ListId, WordEntry};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

/// Separator used for the persisted answers column. The ingestion format
/// splits variants on the same character, so answers can never contain it.
const ANSWERS_SEPARATOR: char = '|';

pub(super) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(super) fn list_id_to_i64(id: ListId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("list_id overflow".into()))
}

pub(super) fn list_id_from_i64(raw: i64) -> Result<ListId, StorageError> {
    u64::try_from(raw)
        .map(ListId::new)
        .map_err(|_| StorageError::Serialization("list_id sign overflow".into()))
}

pub(super) fn join_answers(answers: &[String]) -> String {
    let mut out = String::new();
    for (i, answer) in answers.iter().enumerate() {
        if i > 0 {
            out.push(ANSWERS_SEPARATOR);
        }
        out.push_str(answer);
    }
    out
}

pub(super) fn word_from_row(row: &SqliteRow) -> Result<WordEntry, StorageError> {
    let prompt: String = row.try_get("prompt").map_err(ser)?;
    let answers: String = row.try_get("answers").map_err(ser)?;
    let correct = u32::try_from(row.try_get::<i64, _>("correct_count").map_err(ser)?)
        .map_err(|_| StorageError::Serialization("correct_count overflow".into()))?;
    let incorrect = u32::try_from(row.try_get::<i64, _>("incorrect_count").map_err(ser)?)
        .map_err(|_| StorageError::Serialization("incorrect_count overflow".into()))?;

    WordEntry::from_persisted(
        prompt,
        answers
            .split(ANSWERS_SEPARATOR)
            .map(ToOwned::to_owned)
            .collect(),
        correct,
        incorrect,
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}
