//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::model::CatalogError;
use storage::repository::StorageError;

/// Errors emitted while loading a problem catalog from configuration.
///
/// Both variants are fatal at load: the practice loop refuses to start
/// on malformed content rather than run with it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// Errors emitted by the practice loop.
///
/// Invalid user actions (submitting to a completed problem, selecting an
/// out-of-range index) are not errors; they surface as no-op outcomes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
