mod scheduler;
mod service;
mod view;
mod workflow;

// Public API of the practice session subsystem.
pub use scheduler::{
    CommandQueue, DeferredCommand, SCORE_FOLD_DELAY_MS, STEP_ADVANCE_DELAY_MS, Scheduled,
    score_fold_delay, step_advance_delay,
};
pub use service::{ProblemSession, SessionPhase, SubmitOutcome};
pub use view::PracticeView;
pub use workflow::PracticeLoopService;
