use chrono::{DateTime, Duration, Utc};

/// Milliseconds between an accepted answer and the step advance.
pub const STEP_ADVANCE_DELAY_MS: i64 = 1_000;

/// Milliseconds between problem completion and the score fold.
pub const SCORE_FOLD_DELAY_MS: i64 = 2_000;

/// Delay before an accepted answer advances to the next step.
#[must_use]
pub fn step_advance_delay() -> Duration {
    Duration::milliseconds(STEP_ADVANCE_DELAY_MS)
}

/// Delay before a completed problem's points fold into the total.
#[must_use]
pub fn score_fold_delay() -> Duration {
    Duration::milliseconds(SCORE_FOLD_DELAY_MS)
}

/// A state transition whose effect is deliberately deferred, giving the
/// presentation layer its observation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredCommand {
    /// Move the locked session to its next step, or to completion.
    AdvanceStep,
    /// Fold the completed problem's question points into the total.
    FoldScore,
}

/// A deferred command with its absolute due time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub due_at: DateTime<Utc>,
    pub command: DeferredCommand,
}

/// Queue of deferred commands, applied when their due time passes.
///
/// Replaces ad-hoc timer chains with one explicit structure: commands are
/// taken in schedule order, and a problem switch drains the queue so
/// pending effects land before the snapshot hand-off.
#[derive(Debug, Default, Clone)]
pub struct CommandQueue {
    pending: Vec<Scheduled>,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a command due at `due_at`.
    pub fn schedule(&mut self, command: DeferredCommand, due_at: DateTime<Utc>) {
        self.pending.push(Scheduled { due_at, command });
    }

    /// Remove and return the commands due at `now`, in schedule order.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<DeferredCommand> {
        let mut due = Vec::new();
        self.pending.retain(|scheduled| {
            if scheduled.due_at <= now {
                due.push(scheduled.command);
                false
            } else {
                true
            }
        });
        due
    }

    /// Remove and return every pending command, due or not.
    pub fn drain(&mut self) -> Vec<DeferredCommand> {
        self.pending.drain(..).map(|s| s.command).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
