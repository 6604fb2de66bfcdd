//! Catalog loading from static JSON configuration.

use practice_core::model::{Catalog, CatalogDraft};

use crate::error::CatalogLoadError;

/// Parse and validate a catalog from its JSON configuration text.
///
/// The configuration is an ordered array of problems, each with its
/// ordered steps; see `CatalogDraft` for the accepted shape.
///
/// # Errors
///
/// Returns `CatalogLoadError::Parse` for malformed JSON, and
/// `CatalogLoadError::Invalid` when the content violates catalog
/// invariants (a zero-step problem, a blank option slot, a correct
/// answer missing from its options).
pub fn load_catalog(json: &str) -> Result<Catalog, CatalogLoadError> {
    let draft: CatalogDraft = serde_json::from_str(json)?;
    Ok(draft.validate()?)
}
