use thiserror::Error;

use crate::model::ids::ArtistId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArtistError {
    #[error("artist name cannot be empty")]
    EmptyName,
}

/// A performer whose songs carry vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    id: ArtistId,
    name: String,
}

impl Artist {
    /// # Errors
    ///
    /// Returns `ArtistError::EmptyName` if the name is blank.
    pub fn new(id: ArtistId, name: impl Into<String>) -> Result<Self, ArtistError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ArtistError::EmptyName);
        }
        Ok(Self { id, name })
    }

    #[must_use]
    pub fn id(&self) -> ArtistId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
