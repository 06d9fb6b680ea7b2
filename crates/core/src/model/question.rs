use std::collections::HashSet;

use thiserror::Error;

use crate::model::quiz::{CHOICES_PER_QUESTION, Direction};
use crate::model::vocab::VocabularyItem;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("expected {expected} choices, got {actual}")]
    ChoiceCount { expected: usize, actual: usize },

    #[error("duplicate choice: {0}")]
    DuplicateChoice(String),

    #[error("correct answer is missing from the choices")]
    MissingAnswer,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One multiple-choice question.
///
/// The choice order is fixed when the question is built and never changes
/// afterwards, so re-rendering a question cannot move the correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    item: VocabularyItem,
    direction: Direction,
    choices: Vec<String>,
}

impl Question {
    /// Freeze a question from its source item and already-ordered choices.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` unless there are exactly four pairwise distinct
    /// choices and one of them is the item's answer for `direction`.
    pub fn new(
        item: VocabularyItem,
        direction: Direction,
        choices: Vec<String>,
    ) -> Result<Self, QuestionError> {
        if choices.len() != CHOICES_PER_QUESTION {
            return Err(QuestionError::ChoiceCount {
                expected: CHOICES_PER_QUESTION,
                actual: choices.len(),
            });
        }

        let mut seen = HashSet::with_capacity(choices.len());
        for choice in &choices {
            if !seen.insert(choice.as_str()) {
                return Err(QuestionError::DuplicateChoice(choice.clone()));
            }
        }

        if !seen.contains(direction.answer_of(&item)) {
            return Err(QuestionError::MissingAnswer);
        }

        Ok(Self {
            item,
            direction,
            choices,
        })
    }

    #[must_use]
    pub fn item(&self) -> &VocabularyItem {
        &self.item
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Text shown to the learner.
    #[must_use]
    pub fn prompt(&self) -> &str {
        self.direction.prompt_of(&self.item)
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        self.direction.answer_of(&self.item)
    }

    /// Position of the correct answer within `choices()`.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        let answer = self.correct_answer();
        self.choices.iter().position(|c| c == answer)
    }

    /// Exact string comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, chosen: &str) -> bool {
        chosen == self.correct_answer()
    }
}

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// The learner's answer to the question at `question_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub item: VocabularyItem,
    pub chosen: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(question_index: usize, question: &Question, chosen: impl Into<String>) -> Self {
        let chosen = chosen.into();
        let is_correct = question.is_correct(&chosen);
        Self {
            question_index,
            item: question.item().clone(),
            chosen,
            correct_answer: question.correct_answer().to_owned(),
            is_correct,
        }
    }
}
