use serde_json::{Map, Value};

/// Raw request fields, keyed by their wire names
pub type Fields = Map<String, Value>;

/// Rejected input; each variant carries the offending field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    Missing(String),

    #[error("Invalid numeric value for {0}")]
    NotNumeric(String),

    #[error("Negative value not allowed for {0}")]
    Negative(String),
}

/// Interpret a JSON value as a finite number.
///
/// Numbers are taken as is; strings are trimmed and parsed, so `"12.5"` and
/// `" 1e3 "` are accepted. Booleans, nulls, arrays, objects, and anything
/// that parses to NaN or infinity are not numbers.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}

/// Read one required field as a non-negative number
pub fn require_number(fields: &Fields, field: &str) -> Result<f64, ValidationError> {
    let value = fields
        .get(field)
        .ok_or_else(|| ValidationError::Missing(field.to_string()))?;

    let number = parse_number(value).ok_or_else(|| ValidationError::NotNumeric(field.to_string()))?;

    if number < 0.0 {
        return Err(ValidationError::Negative(field.to_string()));
    }

    Ok(number)
}

/// Check every required field in order; the first failure wins.
pub fn validate_required(fields: &Fields, required: &[&str]) -> Result<(), ValidationError> {
    for field in required {
        require_number(fields, field)?;
    }
    Ok(())
}

/// Optional categorical attribute. Non-string values count as absent.
pub fn attribute(fields: &Fields, field: &str) -> Option<String> {
    fields.get(field).and_then(Value::as_str).map(str::to_owned)
}
