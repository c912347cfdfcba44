//! Convenience re-exports for the common types
//!
//! ```rust
//! use fence_bom::prelude::*;
//! ```

pub use crate::calculation::{apply_project_rounding, BomCalculator};
pub use crate::catalog::TemplateCatalog;
pub use crate::store::{InMemoryTemplateStore, StoreError, TemplateStore};
pub use fence_bom_core::{
    CalculationContext, ComponentQuantity, FormulaTemplate, MaterialRecord, RoundingLevel,
    ScopeValue,
};
