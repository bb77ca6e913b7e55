//! Numeric validators

use serde_json::{Number, Value};

use crate::error::ValidationError;
use crate::escape::EscapeBuilder;

fn as_number(value: &Value, coerce: bool) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if coerce => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn to_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn numeric_builder(min: Option<f64>, max: Option<f64>, coerce: bool) -> EscapeBuilder {
    EscapeBuilder::new(move |value| {
        let n = as_number(value, coerce)
            .ok_or_else(|| ValidationError::new("expecting a number"))?;
        if !n.is_finite() {
            return Err(ValidationError::new("expecting a finite number"));
        }
        if let Some(min) = min {
            if n < min {
                return Err(ValidationError::new(format!("value must be at least {}", min)));
            }
        }
        if let Some(max) = max {
            if n > max {
                return Err(ValidationError::new(format!("value must be at most {}", max)));
            }
        }
        Ok(to_value(n))
    })
    .numeric()
}

/// Any finite number.
pub fn number() -> EscapeBuilder {
    numeric_builder(None, None, false)
}

/// Any finite number; numeric strings are coerced.
pub fn number_coerced() -> EscapeBuilder {
    numeric_builder(None, None, true)
}

/// A number within `[min, max]` inclusive.
pub fn number_in_range(min: f64, max: f64) -> EscapeBuilder {
    numeric_builder(Some(min), Some(max), false)
}
