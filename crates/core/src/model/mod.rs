mod artist;
mod favorite;
mod ids;
mod miss;
mod question;
mod quiz;
mod song;
mod vocab;

pub use artist::{Artist, ArtistError};
pub use favorite::{Favorite, FavoriteError, FavoriteTarget};
pub use ids::{ArtistId, FavoriteId, MissId, ParseIdError, SongId, UserId};
pub use miss::{MissRecord, MissRecordError, ReviewEntry};
pub use question::{AnswerRecord, Question, QuestionError};
pub use quiz::{
    CHOICES_PER_QUESTION, DEFAULT_QUESTION_COUNT, Direction, MIN_VOCABULARY, QuizConfig,
    QuizConfigError, QuizMode,
};
pub use song::{Song, SongError};
pub use vocab::{VocabularyError, VocabularyItem};
