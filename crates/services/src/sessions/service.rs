use std::fmt;

use practice_core::model::{
    CompletedStep, Problem, ProblemId, ProgressSnapshot, STEP_AWARD, Step,
};

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of the active problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Completed,
}

/// Outcome of submitting an answer for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The answer matched. The step is locked until the deferred advance
    /// lands.
    Accepted {
        /// True when the accepted step was the problem's last one.
        finishes_problem: bool,
    },
    /// The answer did not match; the step stays open for retries.
    Rejected,
    /// The submission was dropped: the problem is already completed, or
    /// the step is locked behind a pending advance.
    Ignored,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Per-problem progression state machine.
///
/// Holds the persisted progress fields plus the transient selection state
/// that never leaves the running session. Seeded fresh on first visit or
/// from a `ProgressSnapshot` on return; re-entering a completed problem
/// restores the finished view with its full answer trail, never a reset.
pub struct ProblemSession {
    problem: Problem,
    phase: SessionPhase,
    current_step: usize,
    completed_answers: Vec<CompletedStep>,
    question_points: u32,
    counter_visible: bool,
    selected_answer: Option<String>,
    last_answer_correct: Option<bool>,
    answer_locked: bool,
    option_cursor: usize,
}

impl ProblemSession {
    /// Start a fresh session at the first step.
    #[must_use]
    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            phase: SessionPhase::InProgress,
            current_step: 0,
            completed_answers: Vec::new(),
            question_points: 0,
            counter_visible: true,
            selected_answer: None,
            last_answer_correct: None,
            answer_locked: false,
            option_cursor: 0,
        }
    }

    /// Resume a session from a saved snapshot.
    ///
    /// Transient selection state starts neutral regardless of what was
    /// happening when the snapshot was taken. The step index is clamped
    /// to the problem's range as a guard against a snapshot saved for a
    /// differently-shaped problem.
    #[must_use]
    pub fn from_snapshot(problem: Problem, snapshot: &ProgressSnapshot) -> Self {
        let current_step = snapshot.current_step_index.min(problem.last_step_index());
        Self {
            phase: if snapshot.is_completed {
                SessionPhase::Completed
            } else {
                SessionPhase::InProgress
            },
            current_step,
            completed_answers: snapshot.completed_answers.clone(),
            question_points: snapshot.question_points,
            counter_visible: snapshot.counter_visible,
            selected_answer: None,
            last_answer_correct: None,
            answer_locked: false,
            option_cursor: 0,
            problem,
        }
    }

    //
    // ─── OPERATIONS ────────────────────────────────────────────────────────────
    //

    /// Submit an answer for the current step.
    ///
    /// A correct answer records the trail entry and the step award
    /// immediately and locks the step; moving on is the deferred
    /// `advance`. An incorrect answer leaves the step open for unlimited
    /// retries. Submissions to a completed problem or a locked step are
    /// swallowed, not errors.
    pub fn submit(&mut self, answer: &str) -> SubmitOutcome {
        if self.phase == SessionPhase::Completed || self.answer_locked {
            return SubmitOutcome::Ignored;
        }
        let Some(step) = self.problem.step(self.current_step) else {
            return SubmitOutcome::Ignored;
        };

        self.selected_answer = Some(answer.to_owned());
        if !step.accepts(answer) {
            self.last_answer_correct = Some(false);
            return SubmitOutcome::Rejected;
        }

        self.last_answer_correct = Some(true);
        self.completed_answers.push(CompletedStep {
            step_number: self.current_step + 1,
            answer: answer.to_owned(),
        });
        self.question_points = self.question_points.saturating_add(STEP_AWARD);
        self.answer_locked = true;

        SubmitOutcome::Accepted {
            finishes_problem: self.current_step == self.problem.last_step_index(),
        }
    }

    /// Apply the deferred transition after an accepted answer.
    ///
    /// Moves to the next step with transient state cleared, or to
    /// `Completed` when the accepted step was the last one. Does nothing
    /// unless an accepted answer is pending.
    pub fn advance(&mut self) {
        if self.phase == SessionPhase::Completed || !self.answer_locked {
            return;
        }
        self.answer_locked = false;
        self.selected_answer = None;
        self.last_answer_correct = None;
        self.option_cursor = 0;
        if self.current_step < self.problem.last_step_index() {
            self.current_step += 1;
        } else {
            self.phase = SessionPhase::Completed;
        }
    }

    /// True when the problem is completed and its points have not yet
    /// been folded into the running total.
    #[must_use]
    pub fn fold_pending(&self) -> bool {
        self.phase == SessionPhase::Completed && self.counter_visible
    }

    /// Take the question points for folding into the total, hiding the
    /// per-problem counter.
    ///
    /// Returns `None` when no fold is pending, which makes a second
    /// finalize a no-op rather than a double count.
    pub fn take_question_points(&mut self) -> Option<u32> {
        if !self.fold_pending() {
            return None;
        }
        let points = self.question_points;
        self.question_points = 0;
        self.counter_visible = false;
        Some(points)
    }

    /// Move the option cursor forward, wrapping within the current step.
    pub fn cursor_next(&mut self) {
        if let Some(count) = self.current_step_options_len() {
            self.option_cursor = (self.option_cursor + 1) % count;
        }
    }

    /// Move the option cursor backward, wrapping within the current step.
    pub fn cursor_previous(&mut self) {
        if let Some(count) = self.current_step_options_len() {
            self.option_cursor = (self.option_cursor + count - 1) % count;
        }
    }

    fn current_step_options_len(&self) -> Option<usize> {
        if self.phase == SessionPhase::Completed {
            return None;
        }
        self.problem
            .step(self.current_step)
            .map(Step::option_count)
    }

    /// Capture the persisted fields as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            current_step_index: self.current_step,
            completed_answers: self.completed_answers.clone(),
            is_completed: self.phase == SessionPhase::Completed,
            question_points: self.question_points,
            counter_visible: self.counter_visible,
        }
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    #[must_use]
    pub fn problem_id(&self) -> ProblemId {
        self.problem.id()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    #[must_use]
    pub fn current_step_index(&self) -> usize {
        self.current_step
    }

    /// The step awaiting an answer, `None` once the problem is completed.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        if self.phase == SessionPhase::Completed {
            return None;
        }
        self.problem.step(self.current_step)
    }

    #[must_use]
    pub fn completed_answers(&self) -> &[CompletedStep] {
        &self.completed_answers
    }

    #[must_use]
    pub fn question_points(&self) -> u32 {
        self.question_points
    }

    #[must_use]
    pub fn counter_visible(&self) -> bool {
        self.counter_visible
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    #[must_use]
    pub fn last_answer_correct(&self) -> Option<bool> {
        self.last_answer_correct
    }

    #[must_use]
    pub fn answer_locked(&self) -> bool {
        self.answer_locked
    }

    #[must_use]
    pub fn option_cursor(&self) -> usize {
        self.option_cursor
    }
}

impl fmt::Debug for ProblemSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemSession")
            .field("problem_id", &self.problem.id())
            .field("phase", &self.phase)
            .field("current_step", &self.current_step)
            .field("completed_len", &self.completed_answers.len())
            .field("question_points", &self.question_points)
            .field("counter_visible", &self.counter_visible)
            .field("answer_locked", &self.answer_locked)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
