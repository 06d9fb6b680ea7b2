use std::sync::Arc;

use tracing::info;

use storage::repository::{ArtistRepository, FavoritesRepository, SongRepository, StorageError};
use utavoca_core::model::{Artist, Favorite, FavoriteId, FavoriteTarget, Song, UserId};

use crate::Clock;
use crate::error::FavoritesError;

/// What a favorite points at, resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteSubject {
    Artist(Artist),
    Song(Song),
    /// The artist or song was removed after being favorited.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteEntry {
    pub favorite: Favorite,
    pub subject: FavoriteSubject,
}

/// A learner's favorite artists and songs.
#[derive(Clone)]
pub struct FavoritesService {
    clock: Clock,
    favorites: Arc<dyn FavoritesRepository>,
    artists: Arc<dyn ArtistRepository>,
    songs: Arc<dyn SongRepository>,
}

impl FavoritesService {
    #[must_use]
    pub fn new(
        clock: Clock,
        favorites: Arc<dyn FavoritesRepository>,
        artists: Arc<dyn ArtistRepository>,
        songs: Arc<dyn SongRepository>,
    ) -> Self {
        Self {
            clock,
            favorites,
            artists,
            songs,
        }
    }

    /// Favorite an existing artist or song.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::UnknownTarget` if it does not exist,
    /// `FavoritesError::AlreadyFavorite` if the learner already has it, or
    /// `FavoritesError::Storage` for backend failures.
    pub async fn add(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<Favorite, FavoritesError> {
        if matches!(self.resolve(target).await?, FavoriteSubject::Missing) {
            return Err(FavoritesError::UnknownTarget(target));
        }

        let favorite = match self
            .favorites
            .add_favorite(user_id, target, self.clock.now())
            .await
        {
            Ok(favorite) => favorite,
            Err(StorageError::Conflict) => return Err(FavoritesError::AlreadyFavorite(target)),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user_id, target = %target, favorite_id = %favorite.id, "favorite added");
        Ok(favorite)
    }

    /// # Errors
    ///
    /// Returns `FavoritesError::Storage` with `StorageError::NotFound` when the
    /// learner owns no such favorite.
    pub async fn remove(&self, user_id: UserId, id: FavoriteId) -> Result<(), FavoritesError> {
        self.favorites.remove_favorite(user_id, id).await?;
        info!(user_id = %user_id, favorite_id = %id, "favorite removed");
        Ok(())
    }

    /// The learner's favorite for `target`, if any.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::Storage` for backend failures.
    pub async fn find(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<Option<Favorite>, FavoritesError> {
        Ok(self.favorites.find_favorite(user_id, target).await?)
    }

    /// Favorites newest first, each joined with its artist or song.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::Storage` for backend failures.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<FavoriteEntry>, FavoritesError> {
        let favorites = self.favorites.list_favorites(user_id).await?;
        let mut out = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            let subject = self.resolve(favorite.target).await?;
            out.push(FavoriteEntry { favorite, subject });
        }
        Ok(out)
    }

    async fn resolve(&self, target: FavoriteTarget) -> Result<FavoriteSubject, StorageError> {
        let subject = match target {
            FavoriteTarget::Artist(id) => self.artists.get_artist(id).await?.map(FavoriteSubject::Artist),
            FavoriteTarget::Song(id) => self.songs.get_song(id).await?.map(FavoriteSubject::Song),
        };
        Ok(subject.unwrap_or(FavoriteSubject::Missing))
    }
}
