use quoter_shared::PriceBreakdown;

use crate::pricing::PricingError;
use crate::validation::{attribute, require_number, validate_required, Fields, ValidationError};

/// A validated input that knows how to price itself
pub trait Priceable {
    fn price(&self) -> Result<PriceBreakdown, PricingError>;
}

/// Validated supplement attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplementInput {
    pub purchase_price: f64,
    pub fx_rate: f64,
    pub weight_grams: f64,
    /// Units in the bottle
    pub count: f64,
    /// Units taken per day
    pub daily_dose: f64,
    pub product_shape: Option<String>,
    pub packing_material: Option<String>,
    pub bottle_size: Option<String>,
    pub male_support: Option<String>,
    pub import_from: Option<String>,
}

impl SupplementInput {
    pub const REQUIRED: [&'static str; 5] = ["purchasePrice", "fxRate", "weightGrams", "count", "dailyDose"];

    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationError> {
        validate_required(fields, &Self::REQUIRED)?;

        Ok(Self {
            purchase_price: require_number(fields, "purchasePrice")?,
            fx_rate: require_number(fields, "fxRate")?,
            weight_grams: require_number(fields, "weightGrams")?,
            count: require_number(fields, "count")?,
            daily_dose: require_number(fields, "dailyDose")?,
            product_shape: attribute(fields, "productShape"),
            packing_material: attribute(fields, "packingMaterial"),
            bottle_size: attribute(fields, "bottleSize"),
            male_support: attribute(fields, "isMaleSupport"),
            import_from: attribute(fields, "importFrom"),
        })
    }
}

/// Validated device attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceInput {
    pub purchase_price: f64,
    pub fx_rate: f64,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub male_support: Option<String>,
    pub import_from: Option<String>,
}

impl DeviceInput {
    pub const REQUIRED: [&'static str; 6] = ["purchasePrice", "fxRate", "lengthCm", "widthCm", "heightCm", "weightKg"];

    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationError> {
        validate_required(fields, &Self::REQUIRED)?;

        Ok(Self {
            purchase_price: require_number(fields, "purchasePrice")?,
            fx_rate: require_number(fields, "fxRate")?,
            length_cm: require_number(fields, "lengthCm")?,
            width_cm: require_number(fields, "widthCm")?,
            height_cm: require_number(fields, "heightCm")?,
            weight_kg: require_number(fields, "weightKg")?,
            male_support: attribute(fields, "isMaleSupport"),
            import_from: attribute(fields, "importFrom"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_supplement_from_fields() {
        let input = SupplementInput::from_fields(&fields(json!({
            "purchasePrice": "10",
            "fxRate": 50,
            "weightGrams": 30,
            "count": 60,
            "dailyDose": 2,
            "productShape": "Gummies",
            "importFrom": 7
        })))
        .unwrap();

        assert_eq!(input.purchase_price, 10.0);
        assert_eq!(input.daily_dose, 2.0);
        assert_eq!(input.product_shape.as_deref(), Some("Gummies"));
        assert_eq!(input.import_from, None);
        assert_eq!(input.bottle_size, None);
    }

    #[test]
    fn test_device_requires_all_six() {
        let err = DeviceInput::from_fields(&fields(json!({
            "purchasePrice": 100,
            "fxRate": 50,
            "lengthCm": 20,
            "widthCm": 20,
            "heightCm": 20
        })))
        .unwrap_err();

        assert_eq!(err, ValidationError::Missing("weightKg".to_string()));
    }
}
