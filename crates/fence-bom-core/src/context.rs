//! Calculation context: the layered variable scopes of one BOM calculation

use crate::material::MaterialRecord;
use crate::value::ScopeValue;
use ahash::AHashMap;

/// Mutable state for a single BOM calculation.
///
/// One context per calculation: formulas write their results back into
/// `calculated_values` as they execute, and later formulas read them, so a
/// context must never be shared across concurrent calculations.
///
/// Computed quantities are keyed `"<component_code>_qty"`. The `_qty`
/// suffix is what keeps them from colliding with variable and style keys;
/// the resolver depends on that to tell a `post_count` input apart from a
/// `post_qty` computed quantity.
#[derive(Debug, Clone, Default)]
pub struct CalculationContext {
    /// Net fence length in feet (bracket name `Quantity`)
    pub quantity: f64,
    /// Number of fence lines (bracket name `Lines`)
    pub line_count: f64,
    /// Number of gates (bracket name `Gates`)
    pub gate_count: f64,
    /// Fence height in feet (bracket name `Height`)
    pub height: f64,

    /// SKU-specific variables (numeric or textual)
    pub variables: AHashMap<String, ScopeValue>,

    /// Per-style override values layered on top of the SKU variables
    pub style_adjustments: AHashMap<String, ScopeValue>,

    /// Material attributes keyed `"<component>.<attribute>"`
    pub material_attributes: AHashMap<String, f64>,

    /// Quantities computed so far this pass, keyed `"<component>_qty"`
    pub calculated_values: AHashMap<String, f64>,
}

impl CalculationContext {
    /// Create a context from the four project inputs
    pub fn new(quantity: f64, line_count: f64, gate_count: f64, height: f64) -> Self {
        Self {
            quantity,
            line_count,
            gate_count,
            height,
            ..Default::default()
        }
    }

    /// Look up a built-in project input by its exact bracket name
    pub fn project_input(&self, name: &str) -> Option<f64> {
        match name {
            "Quantity" => Some(self.quantity),
            "Lines" => Some(self.line_count),
            "Gates" => Some(self.gate_count),
            "Height" => Some(self.height),
            _ => None,
        }
    }

    /// Set a SKU variable
    pub fn set_variable<V: Into<ScopeValue>>(&mut self, name: &str, value: V) {
        self.variables.insert(name.to_string(), value.into());
    }

    /// Set a style adjustment
    pub fn set_style_adjustment<V: Into<ScopeValue>>(&mut self, name: &str, value: V) {
        self.style_adjustments.insert(name.to_string(), value.into());
    }

    /// Publish a computed quantity.
    ///
    /// Writes are append-only within one pass: returns `false` and leaves
    /// the stored value untouched when the key already exists.
    pub fn insert_calculated(&mut self, key: &str, value: f64) -> bool {
        if self.calculated_values.contains_key(key) {
            return false;
        }
        self.calculated_values.insert(key.to_string(), value);
        true
    }

    /// Join the SKU's component→material map against the material catalog
    /// rows and publish `"<component>.width_inches"`,
    /// `"<component>.length_feet"` and `"<component>.qty_per_unit"`.
    ///
    /// Width falls back `width_inches` → `actual_width`, length falls back
    /// `length_feet` → `length_ft`. Missing attributes publish nothing.
    pub fn load_material_attributes<'a, I>(&mut self, sku_components: I, materials: &[MaterialRecord])
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (component, sku) in sku_components {
            let Some(record) = materials.iter().find(|m| m.sku == sku) else {
                continue;
            };
            if let Some(width) = record.width() {
                self.material_attributes
                    .insert(format!("{}.width_inches", component), width);
            }
            if let Some(length) = record.length() {
                self.material_attributes
                    .insert(format!("{}.length_feet", component), length);
            }
            if let Some(qty) = record.qty_per_unit {
                self.material_attributes
                    .insert(format!("{}.qty_per_unit", component), qty);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_project_input_names() {
        let ctx = CalculationContext::new(120.0, 3.0, 1.0, 6.0);
        assert_eq!(ctx.project_input("Quantity"), Some(120.0));
        assert_eq!(ctx.project_input("Lines"), Some(3.0));
        assert_eq!(ctx.project_input("Gates"), Some(1.0));
        assert_eq!(ctx.project_input("Height"), Some(6.0));
        assert_eq!(ctx.project_input("quantity"), None);
        assert_eq!(ctx.project_input("post_spacing"), None);
    }

    #[test]
    fn test_insert_calculated_is_append_only() {
        let mut ctx = CalculationContext::default();
        assert!(ctx.insert_calculated("post_qty", 13.0));
        assert!(!ctx.insert_calculated("post_qty", 99.0));
        assert_eq!(ctx.calculated_values.get("post_qty"), Some(&13.0));
    }

    #[test]
    fn test_material_attribute_join() {
        let materials = vec![
            MaterialRecord {
                sku: "PKT-CED-6".into(),
                actual_width: Some(5.5),
                length_ft: Some(6.0),
                qty_per_unit: Some(1.0),
                ..Default::default()
            },
            MaterialRecord {
                sku: "RAIL-8".into(),
                width_inches: Some(3.5),
                length_feet: Some(8.0),
                ..Default::default()
            },
        ];

        let mut ctx = CalculationContext::default();
        ctx.load_material_attributes(
            [("picket", "PKT-CED-6"), ("rail", "RAIL-8"), ("cap", "CAP-X")],
            &materials,
        );

        // fallbacks applied
        assert_eq!(ctx.material_attributes.get("picket.width_inches"), Some(&5.5));
        assert_eq!(ctx.material_attributes.get("picket.length_feet"), Some(&6.0));
        assert_eq!(ctx.material_attributes.get("picket.qty_per_unit"), Some(&1.0));
        // nominal columns win
        assert_eq!(ctx.material_attributes.get("rail.width_inches"), Some(&3.5));
        assert_eq!(ctx.material_attributes.get("rail.length_feet"), Some(&8.0));
        // unmatched SKU publishes nothing
        assert!(ctx.material_attributes.get("rail.qty_per_unit").is_none());
        assert!(ctx.material_attributes.get("cap.width_inches").is_none());
    }
}
