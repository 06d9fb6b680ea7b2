use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use thiserror::Error;

use crate::model::vocab::VocabularyItem;

/// Smallest vocabulary that can produce one correct answer plus three distractors.
pub const MIN_VOCABULARY: usize = 4;

/// Number of answer choices shown for every question.
pub const CHOICES_PER_QUESTION: usize = 4;

/// Question count used when the learner does not pick one.
pub const DEFAULT_QUESTION_COUNT: u32 = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizConfigError {
    #[error("question count must be > 0")]
    ZeroCount,

    #[error("unknown quiz mode: {0}")]
    UnknownMode(String),
}

//
// ─── DIRECTION ─────────────────────────────────────────────────────────────────
//

/// Concrete direction of a single question: what is shown and what is guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Show the written form, guess the meaning.
    WrittenToMeaning,
    /// Show the meaning, guess the written form.
    MeaningToWritten,
}

impl Direction {
    /// The text shown to the learner for `item`.
    #[must_use]
    pub fn prompt_of(self, item: &VocabularyItem) -> &str {
        match self {
            Direction::WrittenToMeaning => item.written(),
            Direction::MeaningToWritten => item.meaning(),
        }
    }

    /// The text the learner has to pick for `item`.
    #[must_use]
    pub fn answer_of(self, item: &VocabularyItem) -> &str {
        match self {
            Direction::WrittenToMeaning => item.meaning(),
            Direction::MeaningToWritten => item.written(),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::WrittenToMeaning => "jp-to-kr",
            Direction::MeaningToWritten => "kr-to-jp",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUIZ MODE ─────────────────────────────────────────────────────────────────
//

/// Direction setting for a whole quiz.
///
/// `Mixed` resolves to a concrete `Direction` independently for every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizMode {
    #[default]
    WrittenToMeaning,
    MeaningToWritten,
    Mixed,
}

impl QuizMode {
    /// The fixed direction for this mode, or `None` for `Mixed`.
    #[must_use]
    pub fn fixed_direction(self) -> Option<Direction> {
        match self {
            QuizMode::WrittenToMeaning => Some(Direction::WrittenToMeaning),
            QuizMode::MeaningToWritten => Some(Direction::MeaningToWritten),
            QuizMode::Mixed => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::WrittenToMeaning => "jp-to-kr",
            QuizMode::MeaningToWritten => "kr-to-jp",
            QuizMode::Mixed => "random",
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizMode {
    type Err = QuizConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "jp-to-kr" | "written-to-meaning" => Ok(QuizMode::WrittenToMeaning),
            "kr-to-jp" | "meaning-to-written" => Ok(QuizMode::MeaningToWritten),
            "random" | "mixed" => Ok(QuizMode::Mixed),
            other => Err(QuizConfigError::UnknownMode(other.to_owned())),
        }
    }
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Mode and requested question count for one quiz.
///
/// The count is an upper bound; generation clamps it to the vocabulary size.
/// It is never zero, so a started quiz always has at least one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    mode: QuizMode,
    count: NonZeroU32,
}

impl QuizConfig {
    /// # Errors
    ///
    /// Returns `QuizConfigError::ZeroCount` when `count` is zero.
    pub fn new(mode: QuizMode, count: u32) -> Result<Self, QuizConfigError> {
        let count = NonZeroU32::new(count).ok_or(QuizConfigError::ZeroCount)?;
        Ok(Self { mode, count })
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count.get()
    }

    /// Number of questions a vocabulary of `available` items yields.
    #[must_use]
    pub fn effective_count(&self, available: usize) -> usize {
        usize::try_from(self.count.get())
            .unwrap_or(usize::MAX)
            .min(available)
    }
}

const DEFAULT_COUNT: NonZeroU32 = match NonZeroU32::new(DEFAULT_QUESTION_COUNT) {
    Some(count) => count,
    None => panic!("default question count must be non-zero"),
};

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            mode: QuizMode::default(),
            count: DEFAULT_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> VocabularyItem {
        VocabularyItem::new("見る", "みる", "보다").unwrap()
    }

    #[test]
    fn direction_picks_prompt_and_answer() {
        let it = item();
        assert_eq!(Direction::WrittenToMeaning.prompt_of(&it), "見る");
        assert_eq!(Direction::WrittenToMeaning.answer_of(&it), "보다");
        assert_eq!(Direction::MeaningToWritten.prompt_of(&it), "보다");
        assert_eq!(Direction::MeaningToWritten.answer_of(&it), "見る");
    }

    #[test]
    fn mode_codes_round_trip() {
        for mode in [QuizMode::WrittenToMeaning, QuizMode::MeaningToWritten, QuizMode::Mixed] {
            assert_eq!(mode.as_str().parse::<QuizMode>().unwrap(), mode);
        }
        assert!(matches!(
            "sideways".parse::<QuizMode>(),
            Err(QuizConfigError::UnknownMode(_))
        ));
    }

    #[test]
    fn mixed_has_no_fixed_direction() {
        assert_eq!(QuizMode::Mixed.fixed_direction(), None);
        assert_eq!(
            QuizMode::MeaningToWritten.fixed_direction(),
            Some(Direction::MeaningToWritten)
        );
    }

    #[test]
    fn zero_count_is_rejected() {
        assert_eq!(
            QuizConfig::new(QuizMode::Mixed, 0).unwrap_err(),
            QuizConfigError::ZeroCount
        );
    }

    #[test]
    fn smallest_config_still_asks_one_question() {
        let config = QuizConfig::new(QuizMode::Mixed, 1).unwrap();
        assert_eq!(config.count(), 1);
        assert_eq!(config.effective_count(MIN_VOCABULARY), 1);
    }

    #[test]
    fn effective_count_is_clamped() {
        let config = QuizConfig::new(QuizMode::WrittenToMeaning, 20).unwrap();
        assert_eq!(config.effective_count(6), 6);
        assert_eq!(config.effective_count(50), 20);
        assert_eq!(QuizConfig::default().count(), DEFAULT_QUESTION_COUNT);
    }
}
