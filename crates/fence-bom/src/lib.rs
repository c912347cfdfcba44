//! # fence-bom
//!
//! A formula-driven bill-of-materials calculation engine for manufactured
//! fence product configurations.
//!
//! Per-component quantity formulas are stored as short spreadsheet-style
//! expression strings (`ROUNDUP([Quantity]/[post_spacing])+1`) in an
//! external template store rather than hardcoded per product. The engine:
//!
//! - selects exactly one active formula per component for a product
//!   type/style, with style-specific rows overriding generic fallbacks
//!   ([`TemplateCatalog`])
//! - resolves bracketed variables across five layered scopes and rewrites
//!   each formula into a small evaluable expression grammar
//! - executes the set in dependency order, publishing each quantity back
//!   into the calculation context for downstream formulas
//!   ([`BomCalculator`])
//! - applies tiered rounding: per-SKU immediately, per-project in a
//!   separate post-pass ([`apply_project_rounding`])
//!
//! A bad formula, missing variable or unreachable template store degrades
//! to zero quantities with log records; nothing in the pipeline panics or
//! propagates an error to the caller.
//!
//! ## Example
//!
//! ```rust
//! use fence_bom::prelude::*;
//!
//! let store = InMemoryTemplateStore::new(vec![FormulaTemplate {
//!     product_type_id: "wood-privacy".into(),
//!     product_style_id: None,
//!     component_type_id: "Line Post".into(),
//!     component_code: "post".into(),
//!     formula: "ROUNDUP([Quantity]/[post_spacing])+1".into(),
//!     rounding_level: RoundingLevel::Sku,
//!     priority: 0,
//!     is_active: true,
//! }]);
//!
//! let engine = BomCalculator::new(store);
//! let mut ctx = CalculationContext::new(120.0, 3.0, 1.0, 6.0);
//! ctx.set_variable("post_spacing", 8.0);
//!
//! let results = engine.calculate("wood-privacy", None, &mut ctx, None);
//! assert_eq!(results[0].rounded_value, 16.0);
//! ```

pub mod calculation;
pub mod catalog;
pub mod prelude;
pub mod store;

pub use calculation::{apply_project_rounding, BomCalculator};
pub use catalog::TemplateCatalog;
pub use store::{InMemoryTemplateStore, StoreError, StoreResult, TemplateStore};

// Re-export core types
pub use fence_bom_core::{
    CalculationContext, ComponentQuantity, FormulaTemplate, MaterialRecord, RoundingLevel,
    ScopeValue,
};

// Re-export the formula pipeline
pub use fence_bom_formula::{
    evaluate_expression, execute_formula, parse_expression, resolve, transform, FormulaError,
};
