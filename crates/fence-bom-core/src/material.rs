//! Material attribute rows

/// A material attribute row from the external catalog.
///
/// The catalog stores dimensions under two generations of column names;
/// `width()` and `length()` apply the documented fallbacks so callers never
/// see the split.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MaterialRecord {
    /// Stock-keeping unit the attributes belong to
    #[cfg_attr(feature = "serde", serde(alias = "materialSku"))]
    pub sku: String,

    /// Nominal width in inches
    #[cfg_attr(feature = "serde", serde(default))]
    pub width_inches: Option<f64>,

    /// Nominal length in feet
    #[cfg_attr(feature = "serde", serde(default))]
    pub length_feet: Option<f64>,

    /// Pieces per sellable unit
    #[cfg_attr(feature = "serde", serde(default))]
    pub qty_per_unit: Option<f64>,

    /// Measured width, used when the nominal width is absent
    #[cfg_attr(feature = "serde", serde(default))]
    pub actual_width: Option<f64>,

    /// Legacy length column, used when `length_feet` is absent
    #[cfg_attr(feature = "serde", serde(default))]
    pub length_ft: Option<f64>,
}

impl MaterialRecord {
    /// Width in inches: `width_inches`, falling back to `actual_width`
    pub fn width(&self) -> Option<f64> {
        self.width_inches.or(self.actual_width)
    }

    /// Length in feet: `length_feet`, falling back to `length_ft`
    pub fn length(&self) -> Option<f64> {
        self.length_feet.or(self.length_ft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_width_fallback() {
        let record = MaterialRecord {
            sku: "PKT-CED-6".into(),
            actual_width: Some(5.5),
            ..Default::default()
        };
        assert_eq!(record.width(), Some(5.5));

        let record = MaterialRecord {
            sku: "PKT-CED-6".into(),
            width_inches: Some(6.0),
            actual_width: Some(5.5),
            ..Default::default()
        };
        assert_eq!(record.width(), Some(6.0));
    }

    #[test]
    fn test_length_fallback() {
        let record = MaterialRecord {
            sku: "RAIL-8".into(),
            length_ft: Some(8.0),
            ..Default::default()
        };
        assert_eq!(record.length(), Some(8.0));

        let record = MaterialRecord {
            sku: "RAIL-8".into(),
            length_feet: Some(16.0),
            length_ft: Some(8.0),
            ..Default::default()
        };
        assert_eq!(record.length(), Some(16.0));
    }
}
