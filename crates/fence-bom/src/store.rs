//! Template store boundary
//!
//! Formula templates live in an external data source; the engine only
//! sees it through [`TemplateStore`]. The trait is the one I/O boundary
//! of the whole pipeline, and the catalog degrades a failing fetch to an
//! empty template set rather than surfacing the error.

use fence_bom_core::FormulaTemplate;
use thiserror::Error;

/// Result type for template store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors a template store can report
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("Template store unavailable: {0}")]
    Unavailable(String),

    /// The store returned rows the engine cannot use
    #[error("Invalid template data: {0}")]
    InvalidData(String),
}

/// Source of formula template rows.
///
/// Implementations return rows already filtered to `is_active = true`,
/// ordered by descending priority; the catalog re-applies both as a
/// defensive measure.
pub trait TemplateStore {
    /// Fetch the active templates for one product type
    fn fetch_active(&self, product_type_id: &str) -> StoreResult<Vec<FormulaTemplate>>;
}

/// A template store over an in-memory row set.
///
/// Backs the CLI's JSON request files and most tests.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    rows: Vec<FormulaTemplate>,
}

impl InMemoryTemplateStore {
    /// Create a store from a row set
    pub fn new(rows: Vec<FormulaTemplate>) -> Self {
        Self { rows }
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn fetch_active(&self, product_type_id: &str) -> StoreResult<Vec<FormulaTemplate>> {
        let mut rows: Vec<FormulaTemplate> = self
            .rows
            .iter()
            .filter(|t| t.is_active && t.product_type_id == product_type_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(rows)
    }
}
