#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod sessions;

pub use practice_core::Clock;

pub use catalog::load_catalog;
pub use error::{CatalogLoadError, PracticeError};

pub use sessions::{
    CommandQueue, DeferredCommand, PracticeLoopService, PracticeView, ProblemSession,
    SessionPhase, SubmitOutcome,
};
