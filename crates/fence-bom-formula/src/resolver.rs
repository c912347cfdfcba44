//! Variable resolver
//!
//! Resolves a bracketed variable name against the five layered scopes of a
//! calculation context. The probe order *is* the business rule: earlier
//! scopes always win, so it is written as an explicit chain rather than a
//! merged map.

use fence_bom_core::{CalculationContext, ScopeValue};

/// Resolve a variable name to a value.
///
/// Scopes, in strict precedence:
/// 1. the four built-in project inputs, by exact name
/// 2. calculated values (`<component>_qty`), always numeric
/// 3. style adjustments; text that doesn't parse as a number stays text
/// 4. SKU variables, under the same coercion rule
/// 5. material attributes, for dotted `component.attribute` names
///
/// An unresolvable name logs a warning and resolves to `0`: a missing
/// variable degrades one quantity to zero instead of aborting the BOM.
pub fn resolve(name: &str, ctx: &CalculationContext) -> ScopeValue {
    if let Some(n) = ctx.project_input(name) {
        return ScopeValue::Number(n);
    }

    if let Some(n) = ctx.calculated_values.get(name) {
        return ScopeValue::Number(*n);
    }

    if let Some(value) = ctx.style_adjustments.get(name) {
        return coerce_scope_value(value);
    }

    if let Some(value) = ctx.variables.get(name) {
        return coerce_scope_value(value);
    }

    if name.contains('.') {
        if let Some(n) = ctx.material_attributes.get(name) {
            return ScopeValue::Number(*n);
        }
        let lower = name.to_lowercase();
        if let Some(n) = ctx.material_attributes.get(&lower) {
            return ScopeValue::Number(*n);
        }
    }

    log::warn!("unresolved variable '{}', defaulting to 0", name);
    ScopeValue::Number(0.0)
}

/// Textual values that don't parse as numbers pass through as text (for
/// string comparisons against style and material codes); everything else
/// coerces to a number, with unparseable input becoming `0`.
fn coerce_scope_value(value: &ScopeValue) -> ScopeValue {
    if value.is_textual() {
        value.clone()
    } else {
        ScopeValue::Number(value.coerce_number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context() -> CalculationContext {
        CalculationContext::new(120.0, 3.0, 1.0, 6.0)
    }

    #[test]
    fn test_project_inputs_win_over_everything() {
        let mut ctx = context();
        ctx.calculated_values.insert("Quantity".into(), 999.0);
        ctx.set_variable("Quantity", 888.0);
        assert_eq!(resolve("Quantity", &ctx), ScopeValue::Number(120.0));
    }

    #[test]
    fn test_calculated_values_win_over_variables() {
        let mut ctx = context();
        ctx.calculated_values.insert("post_qty".into(), 13.0);
        ctx.set_variable("post_qty", 99.0);
        assert_eq!(resolve("post_qty", &ctx), ScopeValue::Number(13.0));
    }

    #[test]
    fn test_style_adjustments_win_over_variables() {
        let mut ctx = context();
        ctx.set_style_adjustment("picket_overlap", 0.5);
        ctx.set_variable("picket_overlap", 1.0);
        assert_eq!(resolve("picket_overlap", &ctx), ScopeValue::Number(0.5));
    }

    #[test]
    fn test_textual_style_adjustment_stays_text() {
        let mut ctx = context();
        ctx.set_style_adjustment("picket_style", "dog-ear");
        assert_eq!(
            resolve("picket_style", &ctx),
            ScopeValue::Text("dog-ear".into())
        );

        // numeric-looking text coerces to a number
        ctx.set_style_adjustment("rail_count", "3");
        assert_eq!(resolve("rail_count", &ctx), ScopeValue::Number(3.0));
    }

    #[test]
    fn test_variables_scope() {
        let mut ctx = context();
        ctx.set_variable("post_spacing", 8.0);
        assert_eq!(resolve("post_spacing", &ctx), ScopeValue::Number(8.0));
    }

    #[test]
    fn test_material_attribute_dotted_lookup() {
        let mut ctx = context();
        ctx.material_attributes
            .insert("picket.width_inches".into(), 5.5);
        assert_eq!(
            resolve("picket.width_inches", &ctx),
            ScopeValue::Number(5.5)
        );
        // lower-case fallback
        assert_eq!(
            resolve("Picket.Width_Inches", &ctx),
            ScopeValue::Number(5.5)
        );
    }

    #[test]
    fn test_unresolved_defaults_to_zero() {
        let ctx = context();
        assert_eq!(resolve("unknown_var", &ctx), ScopeValue::Number(0.0));
        // dotted names that miss both probes also fall through to 0
        assert_eq!(resolve("ghost.width_inches", &ctx), ScopeValue::Number(0.0));
    }
}
