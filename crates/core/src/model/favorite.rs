use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{ArtistId, FavoriteId, SongId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FavoriteError {
    #[error("unknown favorite kind: {0}")]
    UnknownKind(String),
}

/// What a learner marked as a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FavoriteTarget {
    Artist(ArtistId),
    Song(SongId),
}

impl FavoriteTarget {
    /// Stored discriminator: `artist` or `song`.
    #[must_use]
    pub fn kind(self) -> &'static str {
        match self {
            FavoriteTarget::Artist(_) => "artist",
            FavoriteTarget::Song(_) => "song",
        }
    }

    #[must_use]
    pub fn raw_id(self) -> u64 {
        match self {
            FavoriteTarget::Artist(id) => id.value(),
            FavoriteTarget::Song(id) => id.value(),
        }
    }

    /// Rebuild a target from its stored discriminator and id.
    ///
    /// # Errors
    ///
    /// Returns `FavoriteError::UnknownKind` for anything but `artist` or `song`.
    pub fn from_parts(kind: &str, id: u64) -> Result<Self, FavoriteError> {
        match kind {
            "artist" => Ok(FavoriteTarget::Artist(ArtistId::new(id))),
            "song" => Ok(FavoriteTarget::Song(SongId::new(id))),
            other => Err(FavoriteError::UnknownKind(other.to_owned())),
        }
    }
}

impl fmt::Display for FavoriteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw_id())
    }
}

/// A learner's favorite artist or song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub target: FavoriteTarget,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_parts_round_trip() {
        for target in [
            FavoriteTarget::Artist(ArtistId::new(3)),
            FavoriteTarget::Song(SongId::new(8)),
        ] {
            let back = FavoriteTarget::from_parts(target.kind(), target.raw_id()).unwrap();
            assert_eq!(back, target);
        }
        assert_eq!(
            FavoriteTarget::from_parts("album", 1).unwrap_err(),
            FavoriteError::UnknownKind("album".into())
        );
    }

    #[test]
    fn display_names_kind_and_id() {
        assert_eq!(FavoriteTarget::Song(SongId::new(2)).to_string(), "song 2");
    }
}
