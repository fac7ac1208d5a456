use chrono::NaiveDate;
use milim_core::model::DailyProgressRecord;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::ser;
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_day(&self, date: NaiveDate) -> Result<Option<DailyProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT day, sessions_completed, words_mastered
            FROM daily_progress WHERE day = ?1
            ",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => record_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn upsert_day(&self, record: &DailyProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO daily_progress (day, sessions_completed, words_mastered)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(day) DO UPDATE SET
                sessions_completed = excluded.sessions_completed,
                words_mastered = excluded.words_mastered
            ",
        )
        .bind(record.date)
        .bind(i64::from(record.sessions_completed))
        .bind(i64::from(record.words_mastered))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn all_days(&self) -> Result<Vec<DailyProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT day, sessions_completed, words_mastered
            FROM daily_progress
            ORDER BY day ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(record_from_row(&row)?);
        }
        Ok(records)
    }

    async fn clear_days(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM daily_progress")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<DailyProgressRecord, StorageError> {
    Ok(DailyProgressRecord {
        date: row.try_get("day").map_err(ser)?,
        sessions_completed: u32::try_from(
            row.try_get::<i64, _>("sessions_completed").map_err(ser)?,
        )
        .map_err(|_| StorageError::Serialization("sessions_completed overflow".into()))?,
        words_mastered: u32::try_from(row.try_get::<i64, _>("words_mastered").map_err(ser)?)
            .map_err(|_| StorageError::Serialization("words_mastered overflow".into()))?,
    })
}
