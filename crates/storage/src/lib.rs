#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ArtistRepository, FavoritesRepository, InMemoryRepository, MistakeTracker, SongRepository,
    Storage, StorageError, VocabularySource,
};
