//! Composition combinators
//!
//! Everything here produces an [`EscapeBuilder`], so composed validators take
//! the same optionality/list/bounds configuration as atomic ones.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ValidationError;
use crate::escape::{Escape, EscapeBuilder};

/// Validate an exact field set.
///
/// Unrecognized keys are collected into one combined failure rather than
/// failing on the first; known keys are delegated to their sub-validator, and
/// keys whose sub-validator yields nothing are omitted from the output.
pub fn object_validator<K>(shape: impl IntoIterator<Item = (K, Escape)>) -> EscapeBuilder
where
    K: Into<String>,
{
    let shape: Arc<BTreeMap<String, Escape>> = Arc::new(
        shape
            .into_iter()
            .map(|(key, escape)| (key.into(), escape))
            .collect(),
    );

    EscapeBuilder::new(move |value| {
        let map = value
            .as_object()
            .ok_or_else(|| ValidationError::new("expecting an object"))?;

        let unexpected: Vec<&str> = map
            .keys()
            .filter(|key| !shape.contains_key(*key))
            .map(String::as_str)
            .collect();
        if !unexpected.is_empty() {
            return Err(ValidationError::new(format!(
                "unexpected keys: {}",
                unexpected.join(", ")
            )));
        }

        let mut out = serde_json::Map::new();
        for (key, sub) in shape.iter() {
            match sub.apply(map.get(key)).map_err(|e| e.labeled(key.clone()))? {
                Some(escaped) => {
                    out.insert(key.clone(), escaped);
                }
                None => {}
            }
        }
        Ok(Value::Object(out))
    })
    .object()
}

/// Lift a scalar validator into list mode; the list must be non-empty.
pub fn list_validator(builder: &EscapeBuilder) -> EscapeBuilder {
    builder.clone().list()
}

/// Lift a scalar validator into list mode, allowing the empty list.
pub fn list_validator_empty_ok(builder: &EscapeBuilder) -> EscapeBuilder {
    builder.clone().list_empty_ok()
}

/// Try each branch in declaration order and return the first success.
///
/// Order is significant: the first syntactic match wins, not the most
/// specific one. Put narrower branches first.
pub fn or_validator(branches: impl IntoIterator<Item = EscapeBuilder>) -> EscapeBuilder {
    let escapes: Arc<Vec<Escape>> = Arc::new(branches.into_iter().map(|b| b.build()).collect());

    EscapeBuilder::new(move |value| {
        for branch in escapes.iter() {
            if let Ok(Some(escaped)) = branch.apply(Some(value)) {
                return Ok(escaped);
            }
        }
        Err(ValidationError::new(
            "value does not match any expected option",
        ))
    })
}

/// Two-branch form of [`or_validator`].
pub fn binary_or_validator(first: EscapeBuilder, second: EscapeBuilder) -> EscapeBuilder {
    or_validator([first, second])
}

/// Enumeration membership check against a fixed set of allowed values.
pub fn exact_match_validator<V>(allowed: impl IntoIterator<Item = V>) -> EscapeBuilder
where
    V: Into<Value>,
{
    let allowed: Arc<Vec<Value>> = Arc::new(allowed.into_iter().map(Into::into).collect());
    let listing = allowed
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    EscapeBuilder::new(move |value| {
        if allowed.contains(value) {
            Ok(value.clone())
        } else {
            Err(ValidationError::new(format!(
                "value must be one of: {}",
                listing
            )))
        }
    })
}

/// List form of [`exact_match_validator`].
pub fn exact_match_list_validator<V>(allowed: impl IntoIterator<Item = V>) -> EscapeBuilder
where
    V: Into<Value>,
{
    exact_match_validator(allowed).list()
}

/// Validate every key and, independently, every value of a map-shaped object.
///
/// Used for structures indexed by a foreign id, such as per-user unread
/// counts or per-timestamp link-open logs.
pub fn indexable_validator(keys: EscapeBuilder, values: EscapeBuilder) -> EscapeBuilder {
    let key_escape = keys.build();
    let value_escape = values.build();

    EscapeBuilder::new(move |value| {
        let map = value
            .as_object()
            .ok_or_else(|| ValidationError::new("expecting an object"))?;

        let mut out = serde_json::Map::new();
        for (key, entry) in map {
            let escaped_key = key_escape
                .apply_value(&Value::String(key.clone()))
                .map_err(|e| e.labeled(key.clone()))?;
            let escaped_key = match escaped_key {
                Value::String(s) => s,
                other => other.to_string(),
            };
            let escaped_value = value_escape
                .apply_value(entry)
                .map_err(|e| e.labeled(key.clone()))?;
            out.insert(escaped_key, escaped_value);
        }
        Ok(Value::Object(out))
    })
    .object()
}
