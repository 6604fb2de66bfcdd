use practice_core::model::{CompletedStep, ProblemId};

/// Read-only snapshot of everything the presentation layer renders.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no layout decisions (the layout tag passes through opaque)
///
/// The presentation layer decides how to draw options, the counter, and
/// the completion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeView {
    pub problem_index: usize,
    pub problem_id: ProblemId,
    pub question: String,
    pub is_completed: bool,

    /// Index of the step awaiting an answer; meaningless once completed.
    pub step_index: usize,
    pub instruction: Option<String>,
    pub options: Vec<String>,
    pub layout: Option<String>,

    pub completed_answers: Vec<CompletedStep>,
    pub selected_answer: Option<String>,
    pub last_answer_correct: Option<bool>,
    pub option_cursor: usize,

    pub question_points: u32,
    pub counter_visible: bool,
    pub total_points: u32,
}
