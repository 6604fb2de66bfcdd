use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use practice_core::Clock;
use practice_core::model::{Catalog, ScoreLedger};
use storage::repository::ProgressRepository;

use super::scheduler::{CommandQueue, DeferredCommand, score_fold_delay, step_advance_delay};
use super::service::{ProblemSession, SubmitOutcome};
use super::view::PracticeView;
use crate::error::PracticeError;

/// Orchestrates problem navigation, deferred transitions, scoring, and
/// snapshot persistence.
///
/// All state changes happen in response to one inbound event at a time;
/// deferred effects sit in the command queue until `tick` finds them due,
/// or until a problem switch drains them so nothing is lost across the
/// snapshot hand-off.
pub struct PracticeLoopService {
    clock: Clock,
    catalog: Catalog,
    store: Arc<dyn ProgressRepository>,
    ledger: ScoreLedger,
    queue: CommandQueue,
    session: ProblemSession,
    active_index: usize,
}

impl PracticeLoopService {
    /// Start the practice loop at the catalog's first problem with the
    /// default starting total.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the store cannot be read or
    /// written.
    pub async fn start(
        clock: Clock,
        catalog: Catalog,
        store: Arc<dyn ProgressRepository>,
    ) -> Result<Self, PracticeError> {
        Self::start_with_ledger(clock, catalog, store, ScoreLedger::default()).await
    }

    /// Start the practice loop with a caller-supplied score ledger.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the store cannot be read or
    /// written.
    pub async fn start_with_ledger(
        clock: Clock,
        catalog: Catalog,
        store: Arc<dyn ProgressRepository>,
        ledger: ScoreLedger,
    ) -> Result<Self, PracticeError> {
        let problem = catalog.first().clone();
        let session = match store.get_snapshot(problem.id()).await? {
            Some(snapshot) => ProblemSession::from_snapshot(problem, &snapshot),
            None => ProblemSession::new(problem),
        };

        let service = Self {
            clock,
            catalog,
            store,
            ledger,
            queue: CommandQueue::new(),
            session,
            active_index: 0,
        };
        service.persist().await?;
        Ok(service)
    }

    //
    // ─── INBOUND EVENTS ────────────────────────────────────────────────────────
    //

    /// Submit an answer for the active problem's current step.
    ///
    /// On acceptance the step advance is scheduled rather than applied;
    /// the learner sees the accepted answer until the deferral lands via
    /// `tick`.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if persisting the snapshot fails.
    pub async fn submit_answer(&mut self, answer: &str) -> Result<SubmitOutcome, PracticeError> {
        let outcome = self.session.submit(answer);
        match outcome {
            SubmitOutcome::Accepted { finishes_problem } => {
                debug!(
                    problem = %self.session.problem_id(),
                    step = self.session.current_step_index(),
                    finishes_problem,
                    "answer accepted"
                );
                self.queue.schedule(
                    DeferredCommand::AdvanceStep,
                    self.clock.after(step_advance_delay()),
                );
                self.persist().await?;
            }
            SubmitOutcome::Rejected => {
                debug!(problem = %self.session.problem_id(), "answer rejected");
            }
            SubmitOutcome::Ignored => {}
        }
        Ok(outcome)
    }

    /// Apply deferred commands that have come due.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if persisting a snapshot fails.
    pub async fn tick(&mut self) -> Result<(), PracticeError> {
        let due = self.queue.take_due(self.clock.now());
        for command in due {
            self.apply(command).await?;
        }
        Ok(())
    }

    /// Move to the next problem, wrapping past the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the snapshot hand-off fails.
    pub async fn next_problem(&mut self) -> Result<(), PracticeError> {
        let target = self.catalog.next_index(self.active_index);
        self.switch_to(target).await
    }

    /// Move to the previous problem, wrapping before the start.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the snapshot hand-off fails.
    pub async fn previous_problem(&mut self) -> Result<(), PracticeError> {
        let target = self.catalog.previous_index(self.active_index);
        self.switch_to(target).await
    }

    /// Advance to the next problem after finishing one.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the snapshot hand-off fails.
    pub async fn try_another(&mut self) -> Result<(), PracticeError> {
        self.next_problem().await
    }

    /// Reload the active problem from its stored snapshot, clearing
    /// transient selection state.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the snapshot hand-off fails.
    pub async fn restart(&mut self) -> Result<(), PracticeError> {
        self.switch_to(self.active_index).await
    }

    /// Jump directly to a problem by catalog index.
    ///
    /// An out-of-range index, or the index of the already-active problem,
    /// is silently ignored.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the snapshot hand-off fails.
    pub async fn select_problem(&mut self, index: usize) -> Result<(), PracticeError> {
        if index == self.active_index || !self.catalog.contains_index(index) {
            debug!(index, "select ignored");
            return Ok(());
        }
        self.switch_to(index).await
    }

    /// Move the option cursor forward. Transient; nothing is persisted.
    pub fn cursor_next(&mut self) {
        self.session.cursor_next();
    }

    /// Move the option cursor backward. Transient; nothing is persisted.
    pub fn cursor_previous(&mut self) {
        self.session.cursor_previous();
    }

    //
    // ─── DEFERRED EFFECTS ──────────────────────────────────────────────────────
    //

    async fn apply(&mut self, command: DeferredCommand) -> Result<(), PracticeError> {
        match command {
            DeferredCommand::AdvanceStep => {
                self.session.advance();
                if self.session.fold_pending() {
                    debug!(problem = %self.session.problem_id(), "problem completed");
                    self.queue.schedule(
                        DeferredCommand::FoldScore,
                        self.clock.after(score_fold_delay()),
                    );
                }
                self.persist().await?;
            }
            DeferredCommand::FoldScore => {
                if let Some(points) = self.session.take_question_points() {
                    let total = self.ledger.fold(points);
                    debug!(
                        problem = %self.session.problem_id(),
                        points,
                        total,
                        "points folded into total"
                    );
                    self.persist().await?;
                }
            }
        }
        Ok(())
    }

    /// Hand the active snapshot off and seed the target problem.
    ///
    /// Pending deferred effects are applied first so a switch can never
    /// lose an advance or a fold. Applying an advance can schedule the
    /// follow-up fold, so draining repeats until the queue stays empty.
    async fn switch_to(&mut self, index: usize) -> Result<(), PracticeError> {
        loop {
            let pending = self.queue.drain();
            if pending.is_empty() {
                break;
            }
            for command in pending {
                self.apply(command).await?;
            }
        }
        self.persist().await?;

        let Some(problem) = self.catalog.problem(index).cloned() else {
            return Ok(());
        };
        debug!(from = self.active_index, to = index, "switching problem");

        self.session = match self.store.get_snapshot(problem.id()).await? {
            Some(snapshot) => ProblemSession::from_snapshot(problem, &snapshot),
            None => ProblemSession::new(problem),
        };
        self.active_index = index;
        self.persist().await?;
        Ok(())
    }

    async fn persist(&self) -> Result<(), PracticeError> {
        let snapshot = self.session.snapshot();
        self.store
            .save_snapshot(self.session.problem_id(), &snapshot)
            .await?;
        Ok(())
    }

    //
    // ─── OBSERVABLE STATE ──────────────────────────────────────────────────────
    //

    /// Read-only snapshot of everything the presentation layer renders.
    #[must_use]
    pub fn view(&self) -> PracticeView {
        let step = self.session.current_step();
        PracticeView {
            problem_index: self.active_index,
            problem_id: self.session.problem_id(),
            question: self.session.problem().question().to_owned(),
            is_completed: self.session.is_completed(),
            step_index: self.session.current_step_index(),
            instruction: step.map(|s| s.instruction().to_owned()),
            options: step.map(|s| s.options().to_vec()).unwrap_or_default(),
            layout: step.map(|s| s.layout().to_owned()),
            completed_answers: self.session.completed_answers().to_vec(),
            selected_answer: self.session.selected_answer().map(str::to_owned),
            last_answer_correct: self.session.last_answer_correct(),
            option_cursor: self.session.option_cursor(),
            question_points: self.session.question_points(),
            counter_visible: self.session.counter_visible(),
            total_points: self.ledger.total_points(),
        }
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.ledger.total_points()
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// True while deferred commands are waiting for their due time.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Advance the injected clock, for deterministic drivers and tests.
    ///
    /// Has no effect when the loop runs on the system clock.
    pub fn advance_clock(&mut self, delta: Duration) {
        self.clock.advance(delta);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::{Problem, ProblemId, Step};
    use practice_core::time::fixed_clock;
    use storage::repository::InMemoryProgressStore;

    fn build_step(instruction: &str, options: &[&str], correct: &str) -> Step {
        Step::new(
            instruction,
            options.iter().map(|o| (*o).to_string()).collect(),
            correct,
            "vertical",
        )
        .unwrap()
    }

    fn build_catalog() -> Catalog {
        let first = Problem::new(
            ProblemId::new(0),
            "Solve 3x - 2y = 6 + x, y = 2",
            vec![
                build_step("What is the value of y?", &["1", "2", "3", "4"], "2"),
                build_step("What's the final answer?", &["x = 4", "x = 5"], "x = 5"),
            ],
        )
        .unwrap();
        let second = Problem::new(
            ProblemId::new(1),
            "Solve 3x^2 + 10x - 8 = 0",
            vec![build_step(
                "What is the first step?",
                &["Factor the equation", "Guess and check"],
                "Factor the equation",
            )],
        )
        .unwrap();
        Catalog::new(vec![first, second]).unwrap()
    }

    async fn build_service() -> PracticeLoopService {
        PracticeLoopService::start(
            fixed_clock(),
            build_catalog(),
            Arc::new(InMemoryProgressStore::new()),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn accepted_answer_advances_only_after_the_delay() {
        let mut service = build_service().await;

        let outcome = service.submit_answer("2").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Accepted { .. }));
        assert!(service.has_pending());

        // not due yet
        service.tick().await.unwrap();
        assert_eq!(service.view().step_index, 0);
        assert_eq!(service.view().question_points, 10);

        service.advance_clock(step_advance_delay());
        service.tick().await.unwrap();
        assert_eq!(service.view().step_index, 1);
        assert_eq!(service.view().selected_answer, None);
    }

    #[tokio::test]
    async fn rejected_answer_changes_nothing_but_selection() {
        let mut service = build_service().await;

        let outcome = service.submit_answer("3").await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert!(!service.has_pending());

        let view = service.view();
        assert_eq!(view.step_index, 0);
        assert_eq!(view.question_points, 0);
        assert_eq!(view.selected_answer.as_deref(), Some("3"));
        assert_eq!(view.last_answer_correct, Some(false));
    }

    #[tokio::test]
    async fn completion_folds_points_after_its_own_delay() {
        let mut service = build_service().await;
        let starting_total = service.total_points();

        service.submit_answer("2").await.unwrap();
        service.advance_clock(step_advance_delay());
        service.tick().await.unwrap();

        service.submit_answer("x = 5").await.unwrap();
        service.advance_clock(step_advance_delay());
        service.tick().await.unwrap();

        let view = service.view();
        assert!(view.is_completed);
        assert_eq!(view.question_points, 20);
        assert!(view.counter_visible);
        assert_eq!(service.total_points(), starting_total);

        service.advance_clock(score_fold_delay());
        service.tick().await.unwrap();

        let view = service.view();
        assert_eq!(service.total_points(), starting_total + 20);
        assert_eq!(view.question_points, 0);
        assert!(!view.counter_visible);
        assert_eq!(view.completed_answers.len(), 2);
    }

    #[tokio::test]
    async fn repeated_ticks_never_double_fold() {
        let mut service = build_service().await;
        let starting_total = service.total_points();

        for answer in ["2", "x = 5"] {
            service.submit_answer(answer).await.unwrap();
            service.advance_clock(step_advance_delay());
            service.tick().await.unwrap();
        }
        service.advance_clock(score_fold_delay());
        for _ in 0..3 {
            service.tick().await.unwrap();
        }

        assert_eq!(service.total_points(), starting_total + 20);
    }

    #[tokio::test]
    async fn switching_mid_deferral_applies_pending_effects_first() {
        let mut service = build_service().await;
        let starting_total = service.total_points();

        service.submit_answer("2").await.unwrap();
        service.advance_clock(step_advance_delay());
        service.tick().await.unwrap();
        service.submit_answer("x = 5").await.unwrap();
        assert!(service.has_pending());

        // switch away before the advance or the fold are due
        service.next_problem().await.unwrap();
        assert!(!service.has_pending());
        assert_eq!(service.active_index(), 1);
        assert_eq!(service.total_points(), starting_total + 20);

        // the outgoing problem was saved completed, counter hidden
        service.previous_problem().await.unwrap();
        let view = service.view();
        assert!(view.is_completed);
        assert!(!view.counter_visible);
        assert_eq!(view.completed_answers.len(), 2);
    }

    #[tokio::test]
    async fn select_problem_ignores_out_of_range_and_active_index() {
        let mut service = build_service().await;

        service.select_problem(99).await.unwrap();
        assert_eq!(service.active_index(), 0);

        service.submit_answer("3").await.unwrap();
        service.select_problem(0).await.unwrap();
        // still the same session: transient selection survived the no-op
        assert_eq!(service.view().selected_answer.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn restart_reloads_the_stored_snapshot() {
        let mut service = build_service().await;

        service.submit_answer("2").await.unwrap();
        service.advance_clock(step_advance_delay());
        service.tick().await.unwrap();
        service.submit_answer("x = 4").await.unwrap();
        assert_eq!(service.view().selected_answer.as_deref(), Some("x = 4"));

        service.restart().await.unwrap();
        let view = service.view();
        assert_eq!(view.selected_answer, None);
        assert_eq!(view.last_answer_correct, None);
        // persisted progress is untouched
        assert_eq!(view.step_index, 1);
        assert_eq!(view.question_points, 10);
    }

    #[tokio::test]
    async fn submissions_after_completion_are_ignored() {
        let mut service = build_service().await;

        for answer in ["2", "x = 5"] {
            service.submit_answer(answer).await.unwrap();
            service.advance_clock(step_advance_delay());
            service.tick().await.unwrap();
        }
        service.advance_clock(score_fold_delay());
        service.tick().await.unwrap();

        let total = service.total_points();
        let outcome = service.submit_answer("x = 5").await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert_eq!(service.total_points(), total);
        assert_eq!(service.view().completed_answers.len(), 2);
    }
}
