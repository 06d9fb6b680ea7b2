use chrono::{DateTime, Utc};
use utavoca_core::model::{Favorite, FavoriteId, FavoriteTarget, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_favorite_row};
use crate::repository::{FavoritesRepository, StorageError};

const FAVORITE_COLUMNS: &str = "id, user_id, favoritable_type, favoritable_id, created_at";

#[async_trait::async_trait]
impl FavoritesRepository for SqliteRepository {
    async fn add_favorite(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
        at: DateTime<Utc>,
    ) -> Result<Favorite, StorageError> {
        // DO NOTHING yields no row on a duplicate, which maps to Conflict.
        let sql = format!(
            r"
            INSERT INTO favorites (user_id, favoritable_type, favoritable_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, favoritable_type, favoritable_id) DO NOTHING
            RETURNING {FAVORITE_COLUMNS}
            "
        );

        let row = sqlx::query(&sql)
            .bind(id_i64("user_id", user_id.value())?)
            .bind(target.kind())
            .bind(id_i64("favoritable_id", target.raw_id())?)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        match row {
            Some(row) => map_favorite_row(&row),
            None => Err(StorageError::Conflict),
        }
    }

    async fn remove_favorite(&self, user_id: UserId, id: FavoriteId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM favorites WHERE id = ?1 AND user_id = ?2")
            .bind(id_i64("favorite_id", id.value())?)
            .bind(id_i64("user_id", user_id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn find_favorite(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<Option<Favorite>, StorageError> {
        let sql = format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorites \
             WHERE user_id = ?1 AND favoritable_type = ?2 AND favoritable_id = ?3"
        );

        let row = sqlx::query(&sql)
            .bind(id_i64("user_id", user_id.value())?)
            .bind(target.kind())
            .bind(id_i64("favoritable_id", target.raw_id())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_favorite_row).transpose()
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, StorageError> {
        let sql = format!(
            r"
            SELECT {FAVORITE_COLUMNS}
            FROM favorites
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            "
        );

        let rows = sqlx::query(&sql)
            .bind(id_i64("user_id", user_id.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_favorite_row).collect()
    }
}
