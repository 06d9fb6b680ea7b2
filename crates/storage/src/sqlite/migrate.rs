use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the versioned schema migrations.
///
/// Version 1 creates artists, songs (vocabulary stored as a JSON array) and
/// the missed-word tracker with its merge key and review index. Version 2
/// adds per-learner favorites.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS artists (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS songs (
                    id INTEGER PRIMARY KEY,
                    artist_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    vocabs TEXT NOT NULL DEFAULT '[]',
                    FOREIGN KEY (artist_id) REFERENCES artists(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_artist ON songs (artist_id, title);")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS missed_words (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    song_id INTEGER NOT NULL,
                    vocab_name TEXT NOT NULL,
                    vocab_pronunciation TEXT NOT NULL,
                    vocab_meaning TEXT NOT NULL,
                    miss_count INTEGER NOT NULL CHECK (miss_count >= 1),
                    last_missed_at TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    UNIQUE (user_id, song_id, vocab_name),
                    FOREIGN KEY (song_id) REFERENCES songs(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_missed_words_user_review
                    ON missed_words (user_id, miss_count DESC, last_missed_at DESC);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    if !is_applied(pool, 2).await? {
        let mut tx = pool.begin().await?;

        // `favoritable_id` points at an artist or a song depending on the kind,
        // so it carries no foreign key.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS favorites (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    favoritable_type TEXT NOT NULL CHECK (favoritable_type IN ('artist', 'song')),
                    favoritable_id INTEGER NOT NULL,
                    created_at TEXT NOT NULL,
                    UNIQUE (user_id, favoritable_type, favoritable_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(2_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
