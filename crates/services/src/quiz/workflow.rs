use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use storage::repository::{MistakeTracker, VocabularySource};
use utavoca_core::model::{QuizConfig, SongId, UserId, VocabularyItem};

use super::service::{Advance, QuizSession};
use crate::Clock;
use crate::error::QuizLoopError;

/// A quiz session bound to the learner and song it was started for.
#[derive(Debug, Clone)]
pub struct QuizRun {
    pub user_id: UserId,
    pub song_id: SongId,
    pub session: QuizSession,
}

/// Outcome of flushing the missed words of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MistakeReport {
    pub attempted: usize,
    pub recorded: usize,
    pub failed: usize,
}

/// Result of advancing a quiz run.
pub struct AdvanceResult {
    pub advance: Advance,
    /// Present only on the transition that finished the quiz.
    pub pending: Option<PendingReport>,
}

/// Missed words of a finished quiz that still have to be recorded.
///
/// Returned separately so the caller can show the final score before the
/// tracker round-trips complete.
#[must_use = "missed words are recorded only when the report is flushed"]
pub struct PendingReport {
    service: QuizLoopService,
    user_id: UserId,
    song_id: SongId,
    mistakes: Vec<VocabularyItem>,
}

impl PendingReport {
    #[must_use]
    pub fn mistakes(&self) -> &[VocabularyItem] {
        &self.mistakes
    }

    /// Record every missed word; see `QuizLoopService::report_mistakes`.
    pub async fn flush(self) -> MistakeReport {
        self.service
            .report_mistakes(self.user_id, self.song_id, &self.mistakes)
            .await
    }
}

/// Orchestrates quiz start and the end-of-quiz mistake reporting.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    vocabulary: Arc<dyn VocabularySource>,
    misses: Arc<dyn MistakeTracker>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        vocabulary: Arc<dyn VocabularySource>,
        misses: Arc<dyn MistakeTracker>,
    ) -> Self {
        Self {
            clock,
            vocabulary,
            misses,
        }
    }

    /// Load a song's vocabulary and start a quiz over it.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError::Storage` (e.g. `NotFound`) if the vocabulary cannot
    /// be loaded, or `QuizLoopError::Session` if questions cannot be generated.
    pub async fn start_quiz(
        &self,
        user_id: UserId,
        song_id: SongId,
        config: QuizConfig,
    ) -> Result<QuizRun, QuizLoopError> {
        let mut run = QuizRun {
            user_id,
            song_id,
            session: QuizSession::new(),
        };
        self.begin(&mut run, config).await?;
        Ok(run)
    }

    /// Discard the run's session and start a brand-new one for the same song.
    ///
    /// # Errors
    ///
    /// Same as `start_quiz`. On error the run is left in `Setup`.
    pub async fn restart_quiz(
        &self,
        run: &mut QuizRun,
        config: QuizConfig,
    ) -> Result<(), QuizLoopError> {
        run.session.restart();
        self.begin(run, config).await
    }

    async fn begin(&self, run: &mut QuizRun, config: QuizConfig) -> Result<(), QuizLoopError> {
        let items = self.vocabulary.fetch_vocabulary(run.song_id).await?;
        let now = self.clock.now();
        run.session
            .start(&items, config, &mut rand::rng(), now)
            .inspect_err(|e| {
                warn!(song_id = %run.song_id, available = items.len(), error = %e, "quiz start rejected");
            })?;

        info!(
            user_id = %run.user_id,
            song_id = %run.song_id,
            mode = %config.mode(),
            questions = run.session.questions().len(),
            "quiz started"
        );
        Ok(())
    }

    /// Advance the run. The finishing transition hands back a `PendingReport`
    /// with the quiz's missed words.
    ///
    /// The score is final at this point, whatever happens to the report.
    pub fn advance(&self, run: &mut QuizRun) -> AdvanceResult {
        let advance = run.session.advance(self.clock.now());
        let pending = match &advance {
            Advance::Finished { mistakes } => {
                let score = run.session.score();
                info!(
                    user_id = %run.user_id,
                    song_id = %run.song_id,
                    correct = score.correct,
                    answered = score.answered,
                    "quiz finished"
                );
                Some(PendingReport {
                    service: self.clone(),
                    user_id: run.user_id,
                    song_id: run.song_id,
                    mistakes: mistakes.clone(),
                })
            }
            Advance::Next { .. } | Advance::Ignored => None,
        };
        AdvanceResult { advance, pending }
    }

    /// Merge each missed item into the tracker concurrently.
    ///
    /// Requests are independent: a failure is logged and counted, and never
    /// affects the others.
    pub async fn report_mistakes(
        &self,
        user_id: UserId,
        song_id: SongId,
        mistakes: &[VocabularyItem],
    ) -> MistakeReport {
        let at = self.clock.now();
        let tracker = self.misses.as_ref();

        let futures = mistakes.iter().map(|item| async move {
            match tracker.record_miss(user_id, song_id, item, at).await {
                Ok(record) => {
                    debug!(
                        word = item.written(),
                        miss_count = record.miss_count(),
                        "miss recorded"
                    );
                    true
                }
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        song_id = %song_id,
                        word = item.written(),
                        error = %e,
                        "failed to record miss"
                    );
                    false
                }
            }
        });

        let outcomes = join_all(futures).await;
        let recorded = outcomes.iter().filter(|ok| **ok).count();
        let report = MistakeReport {
            attempted: outcomes.len(),
            recorded,
            failed: outcomes.len() - recorded,
        };

        if report.attempted > 0 {
            info!(
                attempted = report.attempted,
                recorded = report.recorded,
                failed = report.failed,
                "mistake report flushed"
            );
        }
        report
    }
}
