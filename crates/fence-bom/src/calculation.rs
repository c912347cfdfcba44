//! BOM calculation engine
//!
//! Runs a resolved formula set in dependency order against a calculation
//! context, applying per-formula rounding and publishing each result back
//! into the context for downstream formulas.
//!
//! # Example
//!
//! ```rust
//! use fence_bom::prelude::*;
//!
//! let templates = vec![FormulaTemplate {
//!     product_type_id: "wood-privacy".into(),
//!     product_style_id: None,
//!     component_type_id: "Line Post".into(),
//!     component_code: "post".into(),
//!     formula: "ROUNDUP([Quantity]/[post_spacing])+1".into(),
//!     rounding_level: RoundingLevel::Sku,
//!     priority: 0,
//!     is_active: true,
//! }];
//!
//! let engine = BomCalculator::new(InMemoryTemplateStore::new(templates));
//! let mut ctx = CalculationContext::new(120.0, 3.0, 1.0, 6.0);
//! ctx.set_variable("post_spacing", 8.0);
//!
//! let results = engine.calculate("wood-privacy", None, &mut ctx, None);
//! assert_eq!(results[0].rounded_value, 16.0);
//! ```

use crate::catalog::TemplateCatalog;
use crate::store::TemplateStore;
use ahash::AHashMap;
use fence_bom_core::{CalculationContext, ComponentQuantity, FormulaTemplate, RoundingLevel};
use fence_bom_formula::execute_formula;
use once_cell::sync::Lazy;

/// Hand-authored execution order: structural components compute before the
/// components whose quantities derive from them (posts before brackets and
/// concrete, pickets/rails/panels before fasteners). Components not listed
/// sort last, keeping their relative order.
const DEPENDENCY_ORDER: &[&str] = &[
    "post",
    "panel",
    "picket",
    "rail",
    "gate",
    "bracket",
    "cap",
    "hinge",
    "latch",
    "concrete",
    "nail",
    "screw",
];

static DEPENDENCY_RANK: Lazy<AHashMap<&'static str, usize>> = Lazy::new(|| {
    DEPENDENCY_ORDER
        .iter()
        .enumerate()
        .map(|(rank, code)| (*code, rank))
        .collect()
});

fn dependency_rank(component_code: &str) -> usize {
    DEPENDENCY_RANK
        .get(component_code)
        .copied()
        .unwrap_or(usize::MAX)
}

/// The calculation engine: template catalog plus execution loop.
pub struct BomCalculator<S: TemplateStore> {
    catalog: TemplateCatalog<S>,
}

impl<S: TemplateStore> BomCalculator<S> {
    /// Create an engine over a template store
    pub fn new(store: S) -> Self {
        Self {
            catalog: TemplateCatalog::new(store),
        }
    }

    /// The underlying template catalog
    pub fn catalog(&self) -> &TemplateCatalog<S> {
        &self.catalog
    }

    /// Execute every resolved formula for the product type/style against
    /// the context, in dependency order.
    ///
    /// `component_filter` restricts which formulas *execute*; it is
    /// applied after sorting. A filtered-out formula publishes nothing,
    /// so a remaining formula that references its `_qty` resolves that
    /// dependency to `0` through the resolver's soft-failure path.
    ///
    /// Never fails: bad formulas degrade to zero quantities (with log
    /// records), and a failed template fetch yields an empty result set.
    pub fn calculate(
        &self,
        product_type_id: &str,
        style_id: Option<&str>,
        ctx: &mut CalculationContext,
        component_filter: Option<&[&str]>,
    ) -> Vec<ComponentQuantity> {
        let templates = self.catalog.load(product_type_id, style_id);

        let mut ordered: Vec<&FormulaTemplate> = templates.iter().collect();
        ordered.sort_by_key(|t| dependency_rank(&t.component_code));

        let mut results = Vec::with_capacity(ordered.len());
        for template in ordered {
            if let Some(filter) = component_filter {
                if !filter.contains(&template.component_code.as_str()) {
                    continue;
                }
            }
            results.push(execute_template(template, ctx));
        }
        results
    }
}

/// Run one template: transform, evaluate, round, publish.
fn execute_template(template: &FormulaTemplate, ctx: &mut CalculationContext) -> ComponentQuantity {
    let raw_value = execute_formula(&template.formula, ctx);

    // SKU-level rounding happens immediately; project-level rounding is
    // deferred to the aggregate post-pass
    let rounded_value = match template.rounding_level {
        RoundingLevel::Sku => raw_value.ceil(),
        RoundingLevel::Project | RoundingLevel::None => raw_value,
    };

    // the rounded value, not the raw one, feeds downstream formulas
    if !ctx.insert_calculated(&template.result_key(), rounded_value) {
        log::debug!(
            "calculated value '{}' already present, keeping the earlier result",
            template.result_key()
        );
    }

    ComponentQuantity {
        component_code: template.component_code.clone(),
        component_type_id: template.component_type_id.clone(),
        raw_value,
        rounded_value,
        rounding_level: template.rounding_level,
        formula: template.formula.clone(),
    }
}

/// Apply project-level rounding to a finished result list.
///
/// Project-rounded quantities stay fractional during the execution pass
/// (aggregation needs the exact values); this post-pass ceilings them.
pub fn apply_project_rounding(results: &mut [ComponentQuantity]) {
    for result in results {
        if result.rounding_level == RoundingLevel::Project {
            result.rounded_value = result.raw_value.ceil();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTemplateStore;
    use pretty_assertions::assert_eq;

    fn template(code: &str, formula: &str, rounding: RoundingLevel) -> FormulaTemplate {
        FormulaTemplate {
            product_type_id: "wood-privacy".into(),
            product_style_id: None,
            component_type_id: code.into(),
            component_code: code.into(),
            formula: formula.into(),
            rounding_level: rounding,
            priority: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_dependency_order_sorting() {
        // unsorted input: bracket listed before the post it depends on
        let engine = BomCalculator::new(InMemoryTemplateStore::new(vec![
            template("bracket", "[post_qty]*2", RoundingLevel::Sku),
            template("post", "ROUNDUP([Quantity]/[post_spacing])+1", RoundingLevel::Sku),
        ]));

        let mut ctx = CalculationContext::new(96.0, 1.0, 0.0, 6.0);
        ctx.set_variable("post_spacing", 8.0);

        let results = engine.calculate("wood-privacy", None, &mut ctx, None);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].component_code, "post");
        assert_eq!(results[0].rounded_value, 13.0);
        // bracket saw the published post_qty
        assert_eq!(results[1].component_code, "bracket");
        assert_eq!(results[1].rounded_value, 26.0);
    }

    #[test]
    fn test_unknown_components_sort_last_and_stable() {
        let engine = BomCalculator::new(InMemoryTemplateStore::new(vec![
            template("widget", "1", RoundingLevel::None),
            template("gizmo", "2", RoundingLevel::None),
            template("nail", "3", RoundingLevel::None),
        ]));

        let mut ctx = CalculationContext::default();
        let results = engine.calculate("wood-privacy", None, &mut ctx, None);
        let codes: Vec<&str> = results.iter().map(|r| r.component_code.as_str()).collect();
        assert_eq!(codes, vec!["nail", "widget", "gizmo"]);
    }

    #[test]
    fn test_component_filter_skips_execution() {
        let engine = BomCalculator::new(InMemoryTemplateStore::new(vec![
            template("post", "10", RoundingLevel::Sku),
            template("bracket", "[post_qty]*2", RoundingLevel::Sku),
        ]));

        let mut ctx = CalculationContext::default();
        let results = engine.calculate("wood-privacy", None, &mut ctx, Some(&["bracket"]));

        // post never executed, so its _qty resolved to 0
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].component_code, "bracket");
        assert_eq!(results[0].rounded_value, 0.0);
        assert!(ctx.calculated_values.get("post_qty").is_none());
    }

    #[test]
    fn test_rounding_levels() {
        let engine = BomCalculator::new(InMemoryTemplateStore::new(vec![
            template("post", "12.3", RoundingLevel::Sku),
            template("rail", "12.3", RoundingLevel::None),
            template("concrete", "12.3", RoundingLevel::Project),
        ]));

        let mut ctx = CalculationContext::default();
        let mut results = engine.calculate("wood-privacy", None, &mut ctx, None);

        let by_code = |results: &Vec<ComponentQuantity>, code: &str| -> ComponentQuantity {
            results
                .iter()
                .find(|r| r.component_code == code)
                .unwrap()
                .clone()
        };

        assert_eq!(by_code(&results, "post").rounded_value, 13.0);
        assert_eq!(by_code(&results, "rail").rounded_value, 12.3);
        // project rounding is deferred during the pass
        assert_eq!(by_code(&results, "concrete").rounded_value, 12.3);

        apply_project_rounding(&mut results);
        assert_eq!(by_code(&results, "concrete").rounded_value, 13.0);
        assert_eq!(by_code(&results, "concrete").raw_value, 12.3);
        // other levels untouched by the post-pass
        assert_eq!(by_code(&results, "rail").rounded_value, 12.3);
    }

    #[test]
    fn test_rounded_value_feeds_downstream() {
        let engine = BomCalculator::new(InMemoryTemplateStore::new(vec![
            template("post", "12.3", RoundingLevel::Sku),
            template("concrete", "[post_qty]", RoundingLevel::None),
        ]));

        let mut ctx = CalculationContext::default();
        let results = engine.calculate("wood-privacy", None, &mut ctx, None);
        // concrete reads the rounded 13, not the raw 12.3
        assert_eq!(results[1].rounded_value, 13.0);
    }

    #[test]
    fn test_bad_formula_degrades_to_zero_quantity() {
        let engine = BomCalculator::new(InMemoryTemplateStore::new(vec![
            template("post", "IF([Quantity]>0, 1", RoundingLevel::Sku),
            template("rail", "2+2", RoundingLevel::Sku),
        ]));

        let mut ctx = CalculationContext::default();
        let results = engine.calculate("wood-privacy", None, &mut ctx, None);

        // the malformed formula zeroes its own component only
        assert_eq!(results[0].raw_value, 0.0);
        assert_eq!(results[1].rounded_value, 4.0);
    }
}
