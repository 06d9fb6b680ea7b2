/// Correct and answered counts folded from a session's answer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub correct: usize,
    pub answered: usize,
}

impl Score {
    /// Rounded accuracy, `None` while nothing has been answered.
    #[must_use]
    pub fn accuracy_percent(&self) -> Option<u8> {
        if self.answered == 0 {
            return None;
        }
        let pct = (self.correct * 100 + self.answered / 2) / self.answered;
        u8::try_from(pct).ok()
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.answered > 0 && self.correct == self.answered
    }
}

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    /// One-based position of the current question, 0 before start.
    pub position: usize,
    pub is_complete: bool,
}
