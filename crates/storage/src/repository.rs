use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use utavoca_core::model::{
    Artist, ArtistId, Favorite, FavoriteId, FavoriteTarget, MissId, MissRecord, Song, SongId,
    UserId, VocabularyItem,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("already exists")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read access to the vocabulary attached to a song.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    /// Fetch the ordered vocabulary of a song.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the song does not exist, or other storage errors.
    async fn fetch_vocabulary(&self, song_id: SongId) -> Result<Vec<VocabularyItem>, StorageError>;
}

/// Repository contract for songs.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Persist or update a song together with its vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the song cannot be stored.
    async fn upsert_song(&self, song: &Song) -> Result<(), StorageError>;

    /// Fetch a song by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures; a missing song is `Ok(None)`.
    async fn get_song(&self, id: SongId) -> Result<Option<Song>, StorageError>;

    /// List songs ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_songs(&self, limit: u32) -> Result<Vec<Song>, StorageError>;

    /// Songs of one artist ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_songs_by_artist(&self, artist_id: ArtistId) -> Result<Vec<Song>, StorageError>;
}

/// Repository contract for artists.
///
/// Artists are also written as a side effect of `SongRepository::upsert_song`.
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the artist cannot be stored.
    async fn upsert_artist(&self, artist: &Artist) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` for backend failures; a missing artist is `Ok(None)`.
    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, StorageError>;

    /// List artists ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_artists(&self, limit: u32) -> Result<Vec<Artist>, StorageError>;
}

/// Per-learner favorite artists and songs.
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Mark `target` as a favorite of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the learner already has it.
    async fn add_favorite(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
        at: DateTime<Utc>,
    ) -> Result<Favorite, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the learner owns no such favorite.
    async fn remove_favorite(&self, user_id: UserId, id: FavoriteId) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` for backend failures; not favorited is `Ok(None)`.
    async fn find_favorite(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<Option<Favorite>, StorageError>;

    /// Favorites of a learner, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, StorageError>;
}

/// Persistent record of missed words, keyed by `(user, song, written form)`.
#[async_trait]
pub trait MistakeTracker: Send + Sync {
    /// Merge one miss into the tracker.
    ///
    /// Creates the record with a count of one if the key is new, otherwise
    /// increments the count and refreshes `last_missed_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the merge cannot be applied.
    async fn record_miss(
        &self,
        user_id: UserId,
        song_id: SongId,
        item: &VocabularyItem,
        at: DateTime<Utc>,
    ) -> Result<MissRecord, StorageError>;

    /// All misses of a user, most missed first, then most recently missed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_misses(&self, user_id: UserId) -> Result<Vec<MissRecord>, StorageError>;

    /// Fetch one miss owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures; a missing record is `Ok(None)`.
    async fn get_miss(&self, user_id: UserId, id: MissId)
    -> Result<Option<MissRecord>, StorageError>;

    /// Remove a miss owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user has no such record.
    async fn delete_miss(&self, user_id: UserId, id: MissId) -> Result<(), StorageError>;
}

#[derive(Default)]
struct MissTable {
    next_id: u64,
    rows: Vec<MissRecord>,
}

#[derive(Default)]
struct FavoriteTable {
    next_id: u64,
    rows: Vec<Favorite>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    artists: Arc<Mutex<HashMap<ArtistId, Artist>>>,
    songs: Arc<Mutex<HashMap<SongId, Song>>>,
    misses: Arc<Mutex<MissTable>>,
    favorites: Arc<Mutex<FavoriteTable>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: ToString>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl VocabularySource for InMemoryRepository {
    async fn fetch_vocabulary(&self, song_id: SongId) -> Result<Vec<VocabularyItem>, StorageError> {
        let guard = self.songs.lock().map_err(poisoned)?;
        guard
            .get(&song_id)
            .map(|song| song.vocabulary().to_vec())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl SongRepository for InMemoryRepository {
    async fn upsert_song(&self, song: &Song) -> Result<(), StorageError> {
        self.upsert_artist(song.artist()).await?;
        let mut guard = self.songs.lock().map_err(poisoned)?;
        guard.insert(song.id(), song.clone());
        Ok(())
    }

    async fn get_song(&self, id: SongId) -> Result<Option<Song>, StorageError> {
        let guard = self.songs.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_songs(&self, limit: u32) -> Result<Vec<Song>, StorageError> {
        let guard = self.songs.lock().map_err(poisoned)?;
        let mut songs: Vec<Song> = guard.values().cloned().collect();
        songs.sort_by_key(Song::id);
        songs.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(songs)
    }

    async fn list_songs_by_artist(&self, artist_id: ArtistId) -> Result<Vec<Song>, StorageError> {
        let guard = self.songs.lock().map_err(poisoned)?;
        let mut songs: Vec<Song> = guard
            .values()
            .filter(|song| song.artist().id() == artist_id)
            .cloned()
            .collect();
        songs.sort_by(|a, b| a.title().cmp(b.title()).then(a.id().cmp(&b.id())));
        Ok(songs)
    }
}

#[async_trait]
impl ArtistRepository for InMemoryRepository {
    async fn upsert_artist(&self, artist: &Artist) -> Result<(), StorageError> {
        let mut guard = self.artists.lock().map_err(poisoned)?;
        guard.insert(artist.id(), artist.clone());
        Ok(())
    }

    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, StorageError> {
        let guard = self.artists.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_artists(&self, limit: u32) -> Result<Vec<Artist>, StorageError> {
        let guard = self.artists.lock().map_err(poisoned)?;
        let mut artists: Vec<Artist> = guard.values().cloned().collect();
        artists.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
        artists.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(artists)
    }
}

#[async_trait]
impl MistakeTracker for InMemoryRepository {
    async fn record_miss(
        &self,
        user_id: UserId,
        song_id: SongId,
        item: &VocabularyItem,
        at: DateTime<Utc>,
    ) -> Result<MissRecord, StorageError> {
        let mut guard = self.misses.lock().map_err(poisoned)?;
        if let Some(existing) = guard
            .rows
            .iter_mut()
            .find(|r| r.matches(user_id, song_id, item.written()))
        {
            existing.register_miss(at);
            return Ok(existing.clone());
        }

        guard.next_id += 1;
        let record = MissRecord::first(
            MissId::new(guard.next_id),
            user_id,
            song_id,
            item.clone(),
            at,
        );
        guard.rows.push(record.clone());
        Ok(record)
    }

    async fn list_misses(&self, user_id: UserId) -> Result<Vec<MissRecord>, StorageError> {
        let guard = self.misses.lock().map_err(poisoned)?;
        let mut rows: Vec<MissRecord> = guard
            .rows
            .iter()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect();
        rows.sort_by(MissRecord::review_order);
        Ok(rows)
    }

    async fn get_miss(
        &self,
        user_id: UserId,
        id: MissId,
    ) -> Result<Option<MissRecord>, StorageError> {
        let guard = self.misses.lock().map_err(poisoned)?;
        Ok(guard
            .rows
            .iter()
            .find(|r| r.id() == id && r.user_id() == user_id)
            .cloned())
    }

    async fn delete_miss(&self, user_id: UserId, id: MissId) -> Result<(), StorageError> {
        let mut guard = self.misses.lock().map_err(poisoned)?;
        let before = guard.rows.len();
        guard
            .rows
            .retain(|r| !(r.id() == id && r.user_id() == user_id));
        if guard.rows.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl FavoritesRepository for InMemoryRepository {
    async fn add_favorite(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
        at: DateTime<Utc>,
    ) -> Result<Favorite, StorageError> {
        let mut guard = self.favorites.lock().map_err(poisoned)?;
        if guard
            .rows
            .iter()
            .any(|f| f.user_id == user_id && f.target == target)
        {
            return Err(StorageError::Conflict);
        }

        guard.next_id += 1;
        let favorite = Favorite {
            id: FavoriteId::new(guard.next_id),
            user_id,
            target,
            created_at: at,
        };
        guard.rows.push(favorite.clone());
        Ok(favorite)
    }

    async fn remove_favorite(&self, user_id: UserId, id: FavoriteId) -> Result<(), StorageError> {
        let mut guard = self.favorites.lock().map_err(poisoned)?;
        let before = guard.rows.len();
        guard
            .rows
            .retain(|f| !(f.id == id && f.user_id == user_id));
        if guard.rows.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn find_favorite(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<Option<Favorite>, StorageError> {
        let guard = self.favorites.lock().map_err(poisoned)?;
        Ok(guard
            .rows
            .iter()
            .find(|f| f.user_id == user_id && f.target == target)
            .cloned())
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, StorageError> {
        let guard = self.favorites.lock().map_err(poisoned)?;
        let mut rows: Vec<Favorite> = guard
            .rows
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub artists: Arc<dyn ArtistRepository>,
    pub songs: Arc<dyn SongRepository>,
    pub vocabulary: Arc<dyn VocabularySource>,
    pub misses: Arc<dyn MistakeTracker>,
    pub favorites: Arc<dyn FavoritesRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let artists: Arc<dyn ArtistRepository> = Arc::new(repo.clone());
        let songs: Arc<dyn SongRepository> = Arc::new(repo.clone());
        let vocabulary: Arc<dyn VocabularySource> = Arc::new(repo.clone());
        let misses: Arc<dyn MistakeTracker> = Arc::new(repo.clone());
        let favorites: Arc<dyn FavoritesRepository> = Arc::new(repo);
        Self {
            artists,
            songs,
            vocabulary,
            misses,
            favorites,
        }
    }
}
