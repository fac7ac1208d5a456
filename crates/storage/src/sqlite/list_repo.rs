use milim_core::model::{List, ListId, WordEntry};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{join_answers, list_id_from_i64, list_id_to_i64, ser, word_from_row};
use crate::repository::{ListRepository, NewListRecord, StorageError, WordRecord};

#[async_trait::async_trait]
impl ListRepository for SqliteRepository {
    async fn insert_new_list(&self, list: NewListRecord) -> Result<ListId, StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let res = sqlx::query(
            r"
            INSERT INTO lists (name, created_at)
            VALUES (?1, ?2)
            ",
        )
        .bind(&list.name)
        .bind(list.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let id = list_id_from_i64(res.last_insert_rowid())?;
        insert_word_rows(&mut tx, id, &list.words).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(id)
    }

    async fn get_list(&self, id: ListId) -> Result<Option<List>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, created_at
            FROM lists WHERE id = ?1
            ",
        )
        .bind(list_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        self.list_from_row(&row).await.map(Some)
    }

    async fn all_lists(&self) -> Result<Vec<List>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, created_at
            FROM lists
            ORDER BY name ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut lists = Vec::with_capacity(rows.len());
        for row in rows {
            lists.push(self.list_from_row(&row).await?);
        }
        Ok(lists)
    }

    async fn update_list(&self, list: &List) -> Result<(), StorageError> {
        let id = list_id_to_i64(list.id())?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let res = sqlx::query("UPDATE lists SET name = ?2 WHERE id = ?1")
            .bind(id)
            .bind(list.name())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        replace_word_rows(&mut tx, list).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn upsert_list(&self, list: &List) -> Result<(), StorageError> {
        let id = list_id_to_i64(list.id())?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO lists (id, name, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name
            ",
        )
        .bind(id)
        .bind(list.name())
        .bind(list.created_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        replace_word_rows(&mut tx, list).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn delete_list(&self, id: ListId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM lists WHERE id = ?1")
            .bind(list_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn clear_lists(&self) -> Result<(), StorageError> {
        // words go with the lists via ON DELETE CASCADE
        sqlx::query("DELETE FROM lists")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}

impl SqliteRepository {
    async fn list_from_row(&self, row: &SqliteRow) -> Result<List, StorageError> {
        let id = list_id_from_i64(row.try_get("id").map_err(ser)?)?;
        let name: String = row.try_get("name").map_err(ser)?;
        let created_at = row.try_get("created_at").map_err(ser)?;

        let word_rows = sqlx::query(
            r"
            SELECT prompt, answers, correct_count, incorrect_count
            FROM words
            WHERE list_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(list_id_to_i64(id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut words: Vec<WordEntry> = Vec::with_capacity(word_rows.len());
        for word_row in word_rows {
            words.push(word_from_row(&word_row)?);
        }

        List::new(id, name, created_at, words)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

async fn insert_word_rows(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    list_id: ListId,
    words: &[WordRecord],
) -> Result<(), StorageError> {
    let id = list_id_to_i64(list_id)?;
    for (position, word) in words.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO words (list_id, position, prompt, answers, correct_count, incorrect_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(id)
        .bind(
            i64::try_from(position)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?,
        )
        .bind(&word.prompt)
        .bind(join_answers(&word.accepted_answers))
        .bind(i64::from(word.correct_count))
        .bind(i64::from(word.incorrect_count))
        .execute(&mut **tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
    }
    Ok(())
}

async fn replace_word_rows(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    list: &List,
) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM words WHERE list_id = ?1")
        .bind(list_id_to_i64(list.id())?)
        .execute(&mut **tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    let records: Vec<WordRecord> = list.words().iter().map(WordRecord::from_entry).collect();
    insert_word_rows(tx, list.id(), &records).await
}
