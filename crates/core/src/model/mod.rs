mod catalog;
mod ids;
mod problem;
mod progress;
mod score;

pub use catalog::{Catalog, CatalogDraft, CatalogError};
pub use ids::{ParseIdError, ProblemId};
pub use problem::{
    DEFAULT_LAYOUT, Problem, ProblemDraft, ProblemError, Step, StepDraft, StepError,
};
pub use progress::{CompletedStep, ProgressSnapshot};
pub use score::{DEFAULT_STARTING_TOTAL, STEP_AWARD, ScoreLedger};
