use std::sync::Arc;

use storage::repository::{ArtistRepository, FavoritesRepository, SongRepository};
use utavoca_core::model::{Artist, ArtistId, FavoriteId, FavoriteTarget, Song, UserId};

use crate::error::CatalogError;

/// An artist with its songs, as seen by one learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistPage {
    pub artist: Artist,
    /// Ordered by title.
    pub songs: Vec<Song>,
    /// Set when the learner has favorited the artist.
    pub favorite: Option<FavoriteId>,
}

/// Browsing artists and their songs.
#[derive(Clone)]
pub struct CatalogService {
    artists: Arc<dyn ArtistRepository>,
    songs: Arc<dyn SongRepository>,
    favorites: Arc<dyn FavoritesRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        artists: Arc<dyn ArtistRepository>,
        songs: Arc<dyn SongRepository>,
        favorites: Arc<dyn FavoritesRepository>,
    ) -> Self {
        Self {
            artists,
            songs,
            favorites,
        }
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` for backend failures.
    pub async fn artists(&self, limit: u32) -> Result<Vec<Artist>, CatalogError> {
        Ok(self.artists.list_artists(limit).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` for backend failures.
    pub async fn songs(&self, limit: u32) -> Result<Vec<Song>, CatalogError> {
        Ok(self.songs.list_songs(limit).await?)
    }

    /// The favorite state is looked up only for a signed-in learner.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownArtist` if the artist does not exist.
    pub async fn artist_page(
        &self,
        user_id: Option<UserId>,
        artist_id: ArtistId,
    ) -> Result<ArtistPage, CatalogError> {
        let artist = self
            .artists
            .get_artist(artist_id)
            .await?
            .ok_or(CatalogError::UnknownArtist(artist_id))?;
        let songs = self.songs.list_songs_by_artist(artist_id).await?;
        let favorite = match user_id {
            Some(user_id) => self
                .favorites
                .find_favorite(user_id, FavoriteTarget::Artist(artist_id))
                .await?
                .map(|f| f.id),
            None => None,
        };

        Ok(ArtistPage {
            artist,
            songs,
            favorite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use utavoca_core::model::SongId;
    use utavoca_core::time::fixed_now;

    #[tokio::test]
    async fn artist_page_lists_songs_and_favorite_state() {
        let repo = InMemoryRepository::new();
        let artist = Artist::new(ArtistId::new(3), "LiSA").unwrap();
        for (id, title) in [(1, "Homura"), (2, "Gurenge")] {
            let song = Song::new(SongId::new(id), title, artist.clone(), Vec::new()).unwrap();
            repo.upsert_song(&song).await.unwrap();
        }
        let svc = CatalogService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        let user = UserId::new(1);

        let page = svc.artist_page(Some(user), artist.id()).await.unwrap();
        let titles: Vec<&str> = page.songs.iter().map(Song::title).collect();
        assert_eq!(titles, vec!["Gurenge", "Homura"]);
        assert!(page.favorite.is_none());

        let fav = repo
            .add_favorite(user, FavoriteTarget::Artist(artist.id()), fixed_now())
            .await
            .unwrap();
        let page = svc.artist_page(Some(user), artist.id()).await.unwrap();
        assert_eq!(page.favorite, Some(fav.id));
        let anonymous = svc.artist_page(None, artist.id()).await.unwrap();
        assert!(anonymous.favorite.is_none());
        assert_eq!(svc.artists(10).await.unwrap(), vec![artist]);
    }

    #[tokio::test]
    async fn unknown_artist_is_reported() {
        let repo = InMemoryRepository::new();
        let svc = CatalogService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        let err = svc
            .artist_page(None, ArtistId::new(9))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownArtist(id) if id == ArtistId::new(9)));
    }
}
