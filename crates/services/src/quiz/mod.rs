mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::{GenerateError, QuizLoopError, SessionError};
pub use plan::QuestionGenerator;
pub use progress::{QuizProgress, Score};
pub use service::{Advance, QuizPhase, QuizSession, SubmitOutcome};
pub use workflow::{AdvanceResult, MistakeReport, PendingReport, QuizLoopService, QuizRun};
