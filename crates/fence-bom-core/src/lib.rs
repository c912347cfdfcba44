//! # fence-bom-core
//!
//! Core data structures for the fence-bom calculation engine:
//!
//! - [`CalculationContext`]: the five variable scopes one BOM calculation
//!   reads from and writes to
//! - [`FormulaTemplate`]: a stored per-component formula row
//! - [`ComponentQuantity`]: one computed BOM line
//! - [`MaterialRecord`]: a material attribute row from the catalog
//!
//! The formula pipeline itself lives in `fence-bom-formula`; template
//! selection and execution ordering live in the `fence-bom` crate.

pub mod context;
pub mod error;
pub mod material;
pub mod template;
pub mod value;

pub use context::CalculationContext;
pub use error::{Error, Result};
pub use material::MaterialRecord;
pub use template::{ComponentQuantity, FormulaTemplate, RoundingLevel};
pub use value::ScopeValue;
