use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::ProblemId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepError {
    #[error("step instruction cannot be empty")]
    EmptyInstruction,

    #[error("step has no answer options")]
    NoOptions,

    #[error("option {index} is blank")]
    BlankOption { index: usize },

    #[error("option {index} duplicates an earlier option")]
    DuplicateOption { index: usize },

    #[error("correct answer {answer:?} is not among the options")]
    CorrectAnswerMissing { answer: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProblemError {
    #[error("problem question cannot be empty")]
    EmptyQuestion,

    #[error("problem has no steps")]
    NoSteps,

    #[error("invalid step {index}: {source}")]
    Step {
        index: usize,
        #[source]
        source: StepError,
    },
}

//
// ─── STEP ──────────────────────────────────────────────────────────────────────
//

/// Layout tag applied when a step's configuration omits one.
pub const DEFAULT_LAYOUT: &str = "vertical";

/// One multiple-choice checkpoint within a problem.
///
/// The layout tag is opaque to the core; only the presentation layer
/// interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    instruction: String,
    options: Vec<String>,
    correct_answer: String,
    layout: String,
}

impl Step {
    /// Build a step, enforcing option invariants.
    ///
    /// # Errors
    ///
    /// Returns `StepError` when the instruction is blank, the option list
    /// is empty, an option is blank or duplicated, or the correct answer
    /// is not one of the options.
    pub fn new(
        instruction: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        layout: impl Into<String>,
    ) -> Result<Self, StepError> {
        let instruction = instruction.into();
        let correct_answer = correct_answer.into();

        if instruction.trim().is_empty() {
            return Err(StepError::EmptyInstruction);
        }
        if options.is_empty() {
            return Err(StepError::NoOptions);
        }

        let mut seen = HashSet::new();
        for (index, option) in options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(StepError::BlankOption { index });
            }
            if !seen.insert(option.as_str()) {
                return Err(StepError::DuplicateOption { index });
            }
        }

        if !options.iter().any(|option| option == &correct_answer) {
            return Err(StepError::CorrectAnswerMissing {
                answer: correct_answer,
            });
        }

        Ok(Self {
            instruction,
            options,
            correct_answer,
            layout: layout.into(),
        })
    }

    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn layout(&self) -> &str {
        &self.layout
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Decide whether a submitted answer is correct.
    ///
    /// Exact string comparison against the correct option; no trimming,
    /// no case folding. Decoy options compare literally like any other
    /// text.
    #[must_use]
    pub fn accepts(&self, submitted: &str) -> bool {
        submitted == self.correct_answer
    }
}

//
// ─── PROBLEM ───────────────────────────────────────────────────────────────────
//

/// A complete multi-step exercise with a final goal.
///
/// The question text is opaque display content and may embed markup.
/// Immutable after catalog load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    id: ProblemId,
    question: String,
    steps: Vec<Step>,
}

impl Problem {
    /// Build a problem from already-validated steps.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError::EmptyQuestion` or `ProblemError::NoSteps`.
    pub fn new(
        id: ProblemId,
        question: impl Into<String>,
        steps: Vec<Step>,
    ) -> Result<Self, ProblemError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(ProblemError::EmptyQuestion);
        }
        if steps.is_empty() {
            return Err(ProblemError::NoSteps);
        }
        Ok(Self {
            id,
            question,
            steps,
        })
    }

    #[must_use]
    pub fn id(&self) -> ProblemId {
        self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Index of the final step. Steps are guaranteed non-empty.
    #[must_use]
    pub fn last_step_index(&self) -> usize {
        self.steps.len() - 1
    }
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Deserialized shape of a step before invariants are checked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepDraft {
    pub instruction: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    #[serde(rename = "type", default)]
    pub layout: Option<String>,
}

impl StepDraft {
    /// Validate the draft into a `Step`.
    ///
    /// # Errors
    ///
    /// Returns `StepError` when any step invariant is violated.
    pub fn validate(self) -> Result<Step, StepError> {
        let layout = self.layout.unwrap_or_else(|| DEFAULT_LAYOUT.to_string());
        Step::new(self.instruction, self.options, self.correct_answer, layout)
    }
}

/// Deserialized shape of a problem before invariants are checked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProblemDraft {
    pub question: String,
    pub steps: Vec<StepDraft>,
}

impl ProblemDraft {
    /// Validate the draft into a `Problem` carrying the given id.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError`, attributing step failures to their index.
    pub fn validate(self, id: ProblemId) -> Result<Problem, ProblemError> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, draft) in self.steps.into_iter().enumerate() {
            let step = draft
                .validate()
                .map_err(|source| ProblemError::Step { index, source })?;
            steps.push(step);
        }
        Problem::new(id, self.question, steps)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn build_step() -> Step {
        Step::new(
            "What is the value of y?",
            options(&["1", "2", "3", "4"]),
            "2",
            "vertical",
        )
        .unwrap()
    }

    #[test]
    fn accepts_only_the_correct_option() {
        let step = build_step();
        assert!(step.accepts("2"));
        for decoy in ["1", "3", "4"] {
            assert!(!step.accepts(decoy));
        }
    }

    #[test]
    fn comparison_is_literal() {
        let step = build_step();
        assert!(!step.accepts(" 2"));
        assert!(!step.accepts("2 "));
        assert!(!step.accepts(""));
    }

    #[test]
    fn rejects_empty_option_list() {
        let err = Step::new("Pick one", Vec::new(), "x", "vertical").unwrap_err();
        assert!(matches!(err, StepError::NoOptions));
    }

    #[test]
    fn rejects_blank_option_slot() {
        let err = Step::new(
            "Simplify the equation",
            options(&["", "2x = 8", "2x = 10"]),
            "2x = 10",
            "horizontal",
        )
        .unwrap_err();
        assert_eq!(err, StepError::BlankOption { index: 0 });
    }

    #[test]
    fn rejects_duplicate_options() {
        let err = Step::new("Pick one", options(&["a", "b", "a"]), "b", "vertical").unwrap_err();
        assert_eq!(err, StepError::DuplicateOption { index: 2 });
    }

    #[test]
    fn rejects_correct_answer_outside_options() {
        let err = Step::new("Pick one", options(&["a", "b"]), "c", "vertical").unwrap_err();
        assert!(matches!(err, StepError::CorrectAnswerMissing { .. }));
    }

    #[test]
    fn problem_requires_steps() {
        let err = Problem::new(ProblemId::new(0), "Solve x", Vec::new()).unwrap_err();
        assert!(matches!(err, ProblemError::NoSteps));
    }

    #[test]
    fn draft_defaults_layout() {
        let draft = StepDraft {
            instruction: "Pick one".to_string(),
            options: options(&["a", "b"]),
            correct_answer: "a".to_string(),
            layout: None,
        };
        let step = draft.validate().unwrap();
        assert_eq!(step.layout(), DEFAULT_LAYOUT);
    }

    #[test]
    fn problem_draft_attributes_step_failures() {
        let draft = ProblemDraft {
            question: "Solve x".to_string(),
            steps: vec![
                StepDraft {
                    instruction: "Pick one".to_string(),
                    options: options(&["a", "b"]),
                    correct_answer: "a".to_string(),
                    layout: None,
                },
                StepDraft {
                    instruction: "Pick another".to_string(),
                    options: options(&["a", "b"]),
                    correct_answer: "z".to_string(),
                    layout: None,
                },
            ],
        };
        let err = draft.validate(ProblemId::new(0)).unwrap_err();
        assert!(matches!(err, ProblemError::Step { index: 1, .. }));
    }
}
