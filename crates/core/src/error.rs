use thiserror::Error;

use crate::model::CatalogError;
use crate::model::ProblemError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Problem(#[from] ProblemError),
}
