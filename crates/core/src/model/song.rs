use thiserror::Error;

use crate::model::artist::Artist;
use crate::model::ids::SongId;
use crate::model::vocab::VocabularyItem;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SongError {
    #[error("song title cannot be empty")]
    EmptyTitle,
}

/// A song together with its artist and the vocabulary extracted from its lyrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    id: SongId,
    title: String,
    artist: Artist,
    vocabulary: Vec<VocabularyItem>,
}

impl Song {
    /// # Errors
    ///
    /// Returns `SongError::EmptyTitle` if the title is blank.
    pub fn new(
        id: SongId,
        title: impl Into<String>,
        artist: Artist,
        vocabulary: Vec<VocabularyItem>,
    ) -> Result<Self, SongError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(SongError::EmptyTitle);
        }

        Ok(Self {
            id,
            title,
            artist,
            vocabulary,
        })
    }

    #[must_use]
    pub fn id(&self) -> SongId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn artist(&self) -> &Artist {
        &self.artist
    }

    #[must_use]
    pub fn vocabulary(&self) -> &[VocabularyItem] {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::ArtistId;

    fn artist() -> Artist {
        Artist::new(ArtistId::new(1), "Kenshi Yonezu").unwrap()
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = Song::new(SongId::new(1), "  ", artist(), Vec::new()).unwrap_err();
        assert_eq!(err, SongError::EmptyTitle);
    }

    #[test]
    fn song_keeps_its_artist() {
        let song = Song::new(SongId::new(1), " Lemon ", artist(), Vec::new()).unwrap();
        assert_eq!(song.title(), "Lemon");
        assert_eq!(song.artist().name(), "Kenshi Yonezu");
    }
}
