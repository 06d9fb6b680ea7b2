use utavoca_core::model::{Artist, ArtistId, Song, SongId, VocabularyItem};

use super::SqliteRepository;
use super::mapping::{
    conn, decode_vocabulary, encode_vocabulary, id_i64, map_artist_row, map_song_row,
};
use crate::repository::{ArtistRepository, SongRepository, StorageError, VocabularySource};

const SONG_SELECT: &str = r"
    SELECT s.id, s.title, s.vocabs, a.id AS artist_id, a.name AS artist_name
    FROM songs s
    JOIN artists a ON a.id = s.artist_id
";

const UPSERT_ARTIST: &str = r"
    INSERT INTO artists (id, name)
    VALUES (?1, ?2)
    ON CONFLICT(id) DO UPDATE SET name = excluded.name
";

#[async_trait::async_trait]
impl SongRepository for SqliteRepository {
    async fn upsert_song(&self, song: &Song) -> Result<(), StorageError> {
        let vocabs = encode_vocabulary(song.vocabulary())?;
        let artist = song.artist();

        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(UPSERT_ARTIST)
            .bind(id_i64("artist_id", artist.id().value())?)
            .bind(artist.name())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO songs (id, artist_id, title, vocabs)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                artist_id = excluded.artist_id,
                title = excluded.title,
                vocabs = excluded.vocabs
            ",
        )
        .bind(id_i64("song_id", song.id().value())?)
        .bind(id_i64("artist_id", artist.id().value())?)
        .bind(song.title())
        .bind(vocabs)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn get_song(&self, id: SongId) -> Result<Option<Song>, StorageError> {
        let sql = format!("{SONG_SELECT} WHERE s.id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_i64("song_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_song_row).transpose()
    }

    async fn list_songs(&self, limit: u32) -> Result<Vec<Song>, StorageError> {
        let sql = format!("{SONG_SELECT} ORDER BY s.id ASC LIMIT ?1");
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_song_row).collect()
    }

    async fn list_songs_by_artist(&self, artist_id: ArtistId) -> Result<Vec<Song>, StorageError> {
        let sql = format!("{SONG_SELECT} WHERE s.artist_id = ?1 ORDER BY s.title ASC, s.id ASC");
        let rows = sqlx::query(&sql)
            .bind(id_i64("artist_id", artist_id.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_song_row).collect()
    }
}

#[async_trait::async_trait]
impl ArtistRepository for SqliteRepository {
    async fn upsert_artist(&self, artist: &Artist) -> Result<(), StorageError> {
        sqlx::query(UPSERT_ARTIST)
            .bind(id_i64("artist_id", artist.id().value())?)
            .bind(artist.name())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, StorageError> {
        let row = sqlx::query("SELECT id, name FROM artists WHERE id = ?1")
            .bind(id_i64("artist_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_artist_row).transpose()
    }

    async fn list_artists(&self, limit: u32) -> Result<Vec<Artist>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM artists ORDER BY name ASC, id ASC LIMIT ?1")
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_artist_row).collect()
    }
}

#[async_trait::async_trait]
impl VocabularySource for SqliteRepository {
    async fn fetch_vocabulary(&self, song_id: SongId) -> Result<Vec<VocabularyItem>, StorageError> {
        let raw: Option<String> = sqlx::query_scalar("SELECT vocabs FROM songs WHERE id = ?1")
            .bind(id_i64("song_id", song_id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        match raw {
            Some(raw) => decode_vocabulary(&raw),
            None => Err(StorageError::NotFound),
        }
    }
}
