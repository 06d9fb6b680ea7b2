use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use utavoca_core::model::{
    Artist, ArtistId, Favorite, FavoriteId, FavoriteTarget, MissId, MissRecord, Song, SongId,
    UserId, VocabularyItem,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn encode_vocabulary(items: &[VocabularyItem]) -> Result<String, StorageError> {
    serde_json::to_string(items).map_err(ser)
}

pub(crate) fn decode_vocabulary(raw: &str) -> Result<Vec<VocabularyItem>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_artist_row(row: &SqliteRow) -> Result<Artist, StorageError> {
    Artist::new(
        ArtistId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?),
        row.try_get::<String, _>("name").map_err(ser)?,
    )
    .map_err(ser)
}

/// Expects the song columns joined with `artist_id` and `artist_name`.
pub(crate) fn map_song_row(row: &SqliteRow) -> Result<Song, StorageError> {
    let id = SongId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?);
    let vocabs: String = row.try_get("vocabs").map_err(ser)?;
    let artist = Artist::new(
        ArtistId::new(i64_to_u64(
            "artist_id",
            row.try_get::<i64, _>("artist_id").map_err(ser)?,
        )?),
        row.try_get::<String, _>("artist_name").map_err(ser)?,
    )
    .map_err(ser)?;

    Song::new(
        id,
        row.try_get::<String, _>("title").map_err(ser)?,
        artist,
        decode_vocabulary(&vocabs)?,
    )
    .map_err(ser)
}

pub(crate) fn map_favorite_row(row: &SqliteRow) -> Result<Favorite, StorageError> {
    let kind: String = row.try_get("favoritable_type").map_err(ser)?;
    let target_id = i64_to_u64(
        "favoritable_id",
        row.try_get::<i64, _>("favoritable_id").map_err(ser)?,
    )?;

    Ok(Favorite {
        id: FavoriteId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?),
        user_id: UserId::new(i64_to_u64(
            "user_id",
            row.try_get::<i64, _>("user_id").map_err(ser)?,
        )?),
        target: FavoriteTarget::from_parts(&kind, target_id).map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_miss_row(row: &SqliteRow) -> Result<MissRecord, StorageError> {
    let item = VocabularyItem::new(
        row.try_get::<String, _>("vocab_name").map_err(ser)?,
        row.try_get::<String, _>("vocab_pronunciation").map_err(ser)?,
        row.try_get::<String, _>("vocab_meaning").map_err(ser)?,
    )
    .map_err(ser)?;

    let miss_count_i64: i64 = row.try_get("miss_count").map_err(ser)?;
    let miss_count = u32::try_from(miss_count_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid miss_count: {miss_count_i64}"))
    })?;

    MissRecord::from_persisted(
        MissId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?),
        UserId::new(i64_to_u64(
            "user_id",
            row.try_get::<i64, _>("user_id").map_err(ser)?,
        )?),
        SongId::new(i64_to_u64(
            "song_id",
            row.try_get::<i64, _>("song_id").map_err(ser)?,
        )?),
        item,
        miss_count,
        row.try_get("last_missed_at").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}
