//! Free-form custom-field map validator
//!
//! Tenants can attach arbitrary key/value data to records. The map is bounded
//! on every axis so adversarial input stays cheap: key count, key length and
//! per-value serialized size. Keys starting with the reserved prefix are
//! rejected and whitespace-only keys are silently stripped.

use serde_json::Value;

use crate::error::ValidationError;
use crate::escape::EscapeBuilder;

pub const MAX_CUSTOM_FIELDS: usize = 100;
pub const MAX_KEY_LENGTH: usize = 100;
pub const MAX_VALUE_SIZE: usize = 1_000;

/// Keys under this prefix are reserved for framework-managed attributes.
pub const RESERVED_PREFIX: &str = "_";

/// A bounded free-form `key -> value` map.
pub fn custom_fields() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        let map = value
            .as_object()
            .ok_or_else(|| ValidationError::new("expecting an object"))?;

        if map.len() > MAX_CUSTOM_FIELDS {
            return Err(ValidationError::new(format!(
                "too many custom fields, the maximum is {}",
                MAX_CUSTOM_FIELDS
            )));
        }

        let mut out = serde_json::Map::new();
        for (key, entry) in map {
            let trimmed = key.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with(RESERVED_PREFIX) {
                return Err(ValidationError::for_field(
                    trimmed,
                    format!("custom field names must not start with '{}'", RESERVED_PREFIX),
                ));
            }
            if trimmed.chars().count() > MAX_KEY_LENGTH {
                return Err(ValidationError::for_field(
                    trimmed,
                    format!(
                        "custom field names must be at most {} characters long",
                        MAX_KEY_LENGTH
                    ),
                ));
            }
            let serialized = serde_json::to_string(entry)
                .map_err(|_| ValidationError::new("value is not serializable"))?;
            if serialized.len() > MAX_VALUE_SIZE {
                return Err(ValidationError::for_field(
                    trimmed,
                    format!(
                        "custom field values must serialize to at most {} bytes",
                        MAX_VALUE_SIZE
                    ),
                ));
            }
            out.insert(trimmed.to_string(), entry.clone());
        }
        Ok(Value::Object(out))
    })
    .object()
}
