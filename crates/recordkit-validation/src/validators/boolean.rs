//! Boolean validators

use serde_json::Value;

use crate::error::ValidationError;
use crate::escape::EscapeBuilder;

/// A strict boolean. `false` is a real value, never "missing".
pub fn boolean() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        value
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| ValidationError::new("expecting a boolean"))
    })
    .boolean()
}

/// A boolean with coercion from the common string and numeric spellings.
pub fn boolean_coerced() -> EscapeBuilder {
    EscapeBuilder::new(|value| match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(ValidationError::new("expecting a boolean")),
        },
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Ok(Value::Bool(true)),
            Some(f) if f == 0.0 => Ok(Value::Bool(false)),
            _ => Err(ValidationError::new("expecting a boolean")),
        },
        _ => Err(ValidationError::new("expecting a boolean")),
    })
    .boolean()
}
