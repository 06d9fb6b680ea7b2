use chrono::{DateTime, Utc};
use rand::Rng;

use utavoca_core::model::{AnswerRecord, Question, QuizConfig, VocabularyItem};

use super::plan::QuestionGenerator;
use super::progress::{QuizProgress, Score};
use crate::error::SessionError;

//
// ─── PHASES AND OUTCOMES ───────────────────────────────────────────────────────
//

/// Lifecycle of a quiz session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizPhase {
    #[default]
    Setup,
    Active,
    Finished,
}

/// Result of `QuizSession::submit_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<'a> {
    Recorded(&'a AnswerRecord),
    /// Not active, or the current question already has an answer.
    Ignored,
}

/// Result of `QuizSession::advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at `index`.
    Next { index: usize },
    /// The last question was left. Carries every missed item in encounter
    /// order; produced once per session.
    Finished { mistakes: Vec<VocabularyItem> },
    /// Not active, or the current question has not been answered yet.
    Ignored,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session for one learner.
///
/// Owns the generated questions and the answers given so far. Answers line up
/// 1:1 with question indices, so the current question counts as answered when
/// `answers.len() > current`.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    phase: QuizPhase,
    questions: Vec<Question>,
    current: usize,
    answers: Vec<AnswerRecord>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate questions and move from `Setup` to `Active`.
    ///
    /// `started_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` outside `Setup`, or the generation
    /// error; in both cases the session is left untouched.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        items: &[VocabularyItem],
        config: QuizConfig,
        rng: &mut R,
        started_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.phase != QuizPhase::Setup {
            return Err(SessionError::AlreadyStarted);
        }

        let questions = QuestionGenerator::new(config).generate(items, rng)?;
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }

        self.answers = Vec::with_capacity(questions.len());
        self.questions = questions;
        self.current = 0;
        self.started_at = Some(started_at);
        self.completed_at = None;
        self.phase = QuizPhase::Active;
        Ok(())
    }

    /// Record the learner's choice for the current question.
    ///
    /// Only the first submission per question counts; repeats are ignored so a
    /// double-fired UI event cannot change the verdict.
    pub fn submit_answer(&mut self, choice: &str) -> SubmitOutcome<'_> {
        if self.phase != QuizPhase::Active || self.is_current_answered() {
            return SubmitOutcome::Ignored;
        }
        let Some(question) = self.questions.get(self.current) else {
            return SubmitOutcome::Ignored;
        };

        let record = AnswerRecord::new(self.current, question, choice);
        self.answers.push(record);
        match self.answers.last() {
            Some(record) => SubmitOutcome::Recorded(record),
            None => SubmitOutcome::Ignored,
        }
    }

    /// Move past an answered question.
    ///
    /// `now` is stamped as the completion time when the last question is left.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Advance {
        if self.phase != QuizPhase::Active || !self.is_current_answered() {
            return Advance::Ignored;
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            return Advance::Next {
                index: self.current,
            };
        }

        self.current = self.questions.len();
        self.phase = QuizPhase::Finished;
        self.completed_at = Some(now);
        Advance::Finished {
            mistakes: self.mistakes().map(|r| r.item.clone()).collect(),
        }
    }

    /// Tear down everything and return to a fresh `Setup` state.
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    /// Fold the answer records into correct/answered counts.
    #[must_use]
    pub fn score(&self) -> Score {
        self.answers.iter().fold(Score::default(), |mut acc, record| {
            acc.answered += 1;
            if record.is_correct {
                acc.correct += 1;
            }
            acc
        })
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let position = match self.phase {
            QuizPhase::Setup => 0,
            QuizPhase::Active => self.current + 1,
            QuizPhase::Finished => self.questions.len(),
        };
        QuizProgress {
            total: self.questions.len(),
            answered: self.answers.len(),
            position,
            is_complete: self.is_complete(),
        }
    }

    /// Answer records that were wrong, in encounter order.
    pub fn mistakes(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.answers.iter().filter(|r| !r.is_correct)
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == QuizPhase::Finished
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase == QuizPhase::Active {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.answers.len() > self.current
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}
