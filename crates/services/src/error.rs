//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use utavoca_core::model::{ArtistId, FavoriteTarget, QuestionError};

/// Errors emitted by the question generator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    #[error("at least 4 vocabulary items are required, found {available}")]
    InsufficientVocabulary { available: usize },
    #[error("not enough distinct distractors for {written}: found {found} of 3")]
    InsufficientDistractors { written: String, found: usize },
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors emitted by the quiz session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz session already started")]
    AlreadyStarted,
    #[error("quiz has no questions")]
    NoQuestions,
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Errors emitted by `QuizLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizLoopError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ReviewService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReviewServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `FavoritesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FavoritesError {
    #[error("{0} does not exist")]
    UnknownTarget(FavoriteTarget),
    #[error("{0} is already a favorite")]
    AlreadyFavorite(FavoriteTarget),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("artist {0} does not exist")]
    UnknownArtist(ArtistId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
