use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::ProblemId;
use crate::model::problem::{Problem, ProblemDraft, ProblemError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog contains no problems")]
    Empty,

    #[error("invalid problem {index}: {source}")]
    Problem {
        index: usize,
        #[source]
        source: ProblemError,
    },
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Ordered, immutable collection of problems.
///
/// Catalog order is the navigation order; next/previous wrap around so a
/// learner can cycle through the whole set from anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    problems: Vec<Problem>,
}

impl Catalog {
    /// Build a catalog from validated problems.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` when no problems are supplied.
    pub fn new(problems: Vec<Problem>) -> Result<Self, CatalogError> {
        if problems.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { problems })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// A catalog is never empty once constructed; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    #[must_use]
    pub fn problem(&self, index: usize) -> Option<&Problem> {
        self.problems.get(index)
    }

    /// The first problem. Valid because the catalog is non-empty.
    #[must_use]
    pub fn first(&self) -> &Problem {
        &self.problems[0]
    }

    #[must_use]
    pub fn contains_index(&self, index: usize) -> bool {
        index < self.problems.len()
    }

    /// Index of the problem after `index`, wrapping past the end.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.problems.len()
    }

    /// Index of the problem before `index`, wrapping before the start.
    #[must_use]
    pub fn previous_index(&self, index: usize) -> usize {
        (index + self.problems.len() - 1) % self.problems.len()
    }

    #[must_use]
    pub fn index_of(&self, id: ProblemId) -> Option<usize> {
        self.problems.iter().position(|problem| problem.id() == id)
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Deserialized catalog configuration before invariants are checked.
///
/// Problem ids are minted from position during validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CatalogDraft {
    pub problems: Vec<ProblemDraft>,
}

impl CatalogDraft {
    /// Validate the draft into a `Catalog`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError`, attributing problem failures to their
    /// index. Malformed content is rejected here, before the catalog is
    /// ever served.
    pub fn validate(self) -> Result<Catalog, CatalogError> {
        let mut problems = Vec::with_capacity(self.problems.len());
        for (index, draft) in self.problems.into_iter().enumerate() {
            let id = ProblemId::new(index as u64);
            let problem = draft
                .validate(id)
                .map_err(|source| CatalogError::Problem { index, source })?;
            problems.push(problem);
        }
        Catalog::new(problems)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
