use rand::Rng;
use rand::seq::SliceRandom;

use utavoca_core::model::{
    CHOICES_PER_QUESTION, Direction, MIN_VOCABULARY, Question, QuizConfig, VocabularyItem,
};

use crate::error::GenerateError;

/// Builds the question list for one quiz.
///
/// Items are picked without replacement, so no word is asked twice in one
/// generation. Each question's choice order is shuffled once here and frozen
/// inside the returned `Question`.
pub struct QuestionGenerator {
    config: QuizConfig,
}

impl QuestionGenerator {
    #[must_use]
    pub fn new(config: QuizConfig) -> Self {
        Self { config }
    }

    /// Generate `min(count, items.len())` questions.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::InsufficientVocabulary` for fewer than four items and
    /// `GenerateError::InsufficientDistractors` when a question cannot get three
    /// distinct wrong choices.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        items: &[VocabularyItem],
        rng: &mut R,
    ) -> Result<Vec<Question>, GenerateError> {
        if items.len() < MIN_VOCABULARY {
            return Err(GenerateError::InsufficientVocabulary {
                available: items.len(),
            });
        }

        let count = self.config.effective_count(items.len());
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.shuffle(rng);

        let mut questions = Vec::with_capacity(count);
        for idx in order.into_iter().take(count) {
            questions.push(self.build_question(items, &items[idx], rng)?);
        }
        Ok(questions)
    }

    fn resolve_direction<R: Rng + ?Sized>(&self, rng: &mut R) -> Direction {
        self.config.mode().fixed_direction().unwrap_or_else(|| {
            if rng.random_bool(0.5) {
                Direction::WrittenToMeaning
            } else {
                Direction::MeaningToWritten
            }
        })
    }

    fn build_question<R: Rng + ?Sized>(
        &self,
        items: &[VocabularyItem],
        item: &VocabularyItem,
        rng: &mut R,
    ) -> Result<Question, GenerateError> {
        let direction = self.resolve_direction(rng);

        // Exclude by written form: words sharing a meaning still serve as distractors.
        let mut pool: Vec<&VocabularyItem> = items
            .iter()
            .filter(|candidate| candidate.written() != item.written())
            .collect();
        pool.shuffle(rng);

        let mut choices: Vec<String> = Vec::with_capacity(CHOICES_PER_QUESTION);
        choices.push(direction.answer_of(item).to_owned());
        for candidate in pool {
            if choices.len() == CHOICES_PER_QUESTION {
                break;
            }
            let text = direction.answer_of(candidate);
            if choices.iter().any(|c| c == text) {
                continue;
            }
            choices.push(text.to_owned());
        }

        if choices.len() < CHOICES_PER_QUESTION {
            return Err(GenerateError::InsufficientDistractors {
                written: item.written().to_owned(),
                found: choices.len() - 1,
            });
        }

        choices.shuffle(rng);
        Ok(Question::new(item.clone(), direction, choices)?)
    }
}
