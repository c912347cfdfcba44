//! Formula template and result records

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// When a computed quantity gets rounded up to a whole unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RoundingLevel {
    /// Round up immediately, per item, as the formula executes
    #[default]
    Sku,
    /// Leave fractional per item; rounded in an aggregate post-pass
    Project,
    /// Never rounded
    None,
}

impl FromStr for RoundingLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sku" => Ok(RoundingLevel::Sku),
            "project" => Ok(RoundingLevel::Project),
            "none" => Ok(RoundingLevel::None),
            other => Err(Error::UnknownRoundingLevel(other.to_string())),
        }
    }
}

impl fmt::Display for RoundingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundingLevel::Sku => "sku",
            RoundingLevel::Project => "project",
            RoundingLevel::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// A stored formula row: one candidate formula for one component of one
/// product type.
///
/// Loaded read-only from the external template store, cached by the
/// catalog, and shared across calculations. `product_style_id` of `None`
/// marks the generic fallback row; a style-specific row overrides it for
/// that style.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FormulaTemplate {
    /// Product type this formula belongs to
    pub product_type_id: String,

    /// Style this formula is specific to; `None` = generic fallback
    #[cfg_attr(feature = "serde", serde(default))]
    pub product_style_id: Option<String>,

    /// Component type identifier (display name in the catalog)
    pub component_type_id: String,

    /// Component code; results publish under `"<code>_qty"`
    pub component_code: String,

    /// Raw spreadsheet-style formula text
    pub formula: String,

    /// Rounding policy applied to this component's quantity
    #[cfg_attr(feature = "serde", serde(default))]
    pub rounding_level: RoundingLevel,

    /// Selection priority; higher wins
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,

    /// Inactive rows are never selected
    #[cfg_attr(feature = "serde", serde(default = "default_active"))]
    pub is_active: bool,
}

#[cfg(feature = "serde")]
fn default_active() -> bool {
    true
}

impl FormulaTemplate {
    /// True when this row is the generic (style-less) fallback
    pub fn is_generic(&self) -> bool {
        self.product_style_id.is_none()
    }

    /// The `calculated_values` key this template's result publishes under
    pub fn result_key(&self) -> String {
        format!("{}_qty", self.component_code)
    }
}

/// One computed BOM line: the output of executing a single formula.
///
/// Immutable after creation. The *rounded* value is what gets written back
/// into the calculation context for downstream formulas.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ComponentQuantity {
    /// Component code from the template
    pub component_code: String,

    /// Component type identifier from the template
    pub component_type_id: String,

    /// Unrounded result of the formula
    pub raw_value: f64,

    /// Result after the per-item rounding policy
    pub rounded_value: f64,

    /// Rounding policy that was applied
    pub rounding_level: RoundingLevel,

    /// The formula text that produced this line
    pub formula: String,
}
