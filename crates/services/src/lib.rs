#![forbid(unsafe_code)]

pub mod catalog_service;
pub mod error;
pub mod favorites_service;
pub mod quiz;
pub mod review_service;

pub use utavoca_core::Clock;

pub use catalog_service::{ArtistPage, CatalogService};
pub use error::{
    CatalogError, FavoritesError, GenerateError, QuizLoopError, ReviewServiceError, SessionError,
};
pub use favorites_service::{FavoriteEntry, FavoriteSubject, FavoritesService};
pub use review_service::{DEFAULT_REVIEW_LIMIT, ReviewService, ReviewStats};

pub use quiz::{
    Advance, AdvanceResult, MistakeReport, PendingReport, QuestionGenerator, QuizLoopService,
    QuizPhase, QuizProgress, QuizRun, QuizSession, Score, SubmitOutcome,
};
