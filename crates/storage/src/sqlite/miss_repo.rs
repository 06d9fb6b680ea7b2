use chrono::{DateTime, Utc};
use utavoca_core::model::{MissId, MissRecord, SongId, UserId, VocabularyItem};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_miss_row};
use crate::repository::{MistakeTracker, StorageError};

const MISS_COLUMNS: &str = "id, user_id, song_id, vocab_name, vocab_pronunciation, vocab_meaning, \
                            miss_count, last_missed_at, created_at";

#[async_trait::async_trait]
impl MistakeTracker for SqliteRepository {
    // Single statement: the merge key is resolved by the unique index, so
    // there is no separate existence check that could fail on its own.
    async fn record_miss(
        &self,
        user_id: UserId,
        song_id: SongId,
        item: &VocabularyItem,
        at: DateTime<Utc>,
    ) -> Result<MissRecord, StorageError> {
        let sql = format!(
            r"
            INSERT INTO missed_words (
                user_id, song_id, vocab_name, vocab_pronunciation, vocab_meaning,
                miss_count, last_missed_at, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            ON CONFLICT(user_id, song_id, vocab_name) DO UPDATE SET
                miss_count = missed_words.miss_count + 1,
                last_missed_at = MAX(missed_words.last_missed_at, excluded.last_missed_at)
            RETURNING {MISS_COLUMNS}
            "
        );

        let row = sqlx::query(&sql)
            .bind(id_i64("user_id", user_id.value())?)
            .bind(id_i64("song_id", song_id.value())?)
            .bind(item.written())
            .bind(item.pronunciation())
            .bind(item.meaning())
            .bind(at)
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;

        map_miss_row(&row)
    }

    async fn list_misses(&self, user_id: UserId) -> Result<Vec<MissRecord>, StorageError> {
        let sql = format!(
            r"
            SELECT {MISS_COLUMNS}
            FROM missed_words
            WHERE user_id = ?1
            ORDER BY miss_count DESC, last_missed_at DESC, id ASC
            "
        );

        let rows = sqlx::query(&sql)
            .bind(id_i64("user_id", user_id.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_miss_row(&row)?);
        }
        Ok(out)
    }

    async fn get_miss(
        &self,
        user_id: UserId,
        id: MissId,
    ) -> Result<Option<MissRecord>, StorageError> {
        let sql = format!("SELECT {MISS_COLUMNS} FROM missed_words WHERE id = ?1 AND user_id = ?2");

        let row = sqlx::query(&sql)
            .bind(id_i64("miss_id", id.value())?)
            .bind(id_i64("user_id", user_id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_miss_row).transpose()
    }

    async fn delete_miss(&self, user_id: UserId, id: MissId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM missed_words WHERE id = ?1 AND user_id = ?2")
            .bind(id_i64("miss_id", id.value())?)
            .bind(id_i64("user_id", user_id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
