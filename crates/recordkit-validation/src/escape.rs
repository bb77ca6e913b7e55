//! Core escape engine
//!
//! An [`EscapeBuilder`] pairs an atomic transform with an [`EscapeOptions`]
//! configuration and builds an [`Escape`], the runnable validator. The builder
//! is cheap to clone, so the same domain validator can be rebuilt in required,
//! optional or list form per call site.
//!
//! Absent input (a field missing from the payload) is modeled as `None` at the
//! [`Escape::apply`] boundary; `Ok(None)` means "omit this key from the
//! output". `Value::Null` stays a distinct, explicit value.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{ValidateResult, ValidationError};

/// Hard cap on elements processed per validation call. Bounds the cost of
/// adversarial list input before it reaches persistence; not configurable.
pub const MAX_BATCH_SIZE: usize = 1000;

/// The atomic transform at the center of a validator: one loosely-typed value
/// in, one conforming value out, or a failure with a descriptive message.
pub type EscapeFn = Arc<dyn Fn(&Value) -> ValidateResult<Value> + Send + Sync>;

/// Configuration applied around an atomic escape.
#[derive(Debug, Clone, Default)]
pub struct EscapeOptions {
    /// Absent input resolves to "omit the key" instead of failing.
    pub is_optional: bool,
    /// `null` passes through unchanged.
    pub null_ok: bool,
    /// `""` passes through unchanged.
    pub empty_string_ok: bool,
    /// In list mode, `[]` passes through unchanged.
    pub empty_list_ok: bool,
    /// Input is object-shaped; JSON-encoded strings are parsed before escaping.
    pub is_object: bool,
    /// Input is numeric; the literal `0` short-circuits the missing-value check.
    pub is_number: bool,
    /// Input is boolean; `false` is not treated as missing.
    pub is_boolean: bool,
    /// Validate a list of elements instead of a single value.
    pub list_of: bool,
    /// Minimum string length after escaping.
    pub min_length: Option<usize>,
    /// Maximum string length (characters) or serialized object size (bytes).
    pub max_length: Option<usize>,
    /// Truncate oversized strings instead of rejecting them.
    pub should_truncate: bool,
    /// Lowercase string input before escaping.
    pub to_lower: bool,
    /// Trim surrounding whitespace from each element before escaping.
    pub trim: bool,
    /// Replaces the message of any failure raised by this validator.
    pub message: Option<String>,
}

/// Factory for [`Escape`] validators: an atomic transform plus chainable
/// configuration. Clone it to derive variants of the same field validator.
#[derive(Clone)]
pub struct EscapeBuilder {
    atomic: EscapeFn,
    options: EscapeOptions,
}

impl EscapeBuilder {
    /// Wrap an atomic transform with default options (required, scalar).
    pub fn new<F>(atomic: F) -> Self
    where
        F: Fn(&Value) -> ValidateResult<Value> + Send + Sync + 'static,
    {
        Self {
            atomic: Arc::new(atomic),
            options: EscapeOptions::default(),
        }
    }

    /// Replace the whole option set at once.
    pub fn with_options(mut self, options: EscapeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EscapeOptions {
        &self.options
    }

    /// Absent input yields "omit the key" instead of a missing-value failure.
    pub fn optional(mut self) -> Self {
        self.options.is_optional = true;
        self
    }

    /// Absent input fails with a missing-value error (the default).
    pub fn required(mut self) -> Self {
        self.options.is_optional = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.options.null_ok = true;
        self
    }

    pub fn empty_string_ok(mut self) -> Self {
        self.options.empty_string_ok = true;
        self
    }

    /// Lift into list mode; the list must be non-empty.
    pub fn list(mut self) -> Self {
        self.options.list_of = true;
        self
    }

    /// Lift into list mode, allowing the empty list.
    pub fn list_empty_ok(mut self) -> Self {
        self.options.list_of = true;
        self.options.empty_list_ok = true;
        self
    }

    pub fn object(mut self) -> Self {
        self.options.is_object = true;
        self
    }

    pub fn numeric(mut self) -> Self {
        self.options.is_number = true;
        self
    }

    pub fn boolean(mut self) -> Self {
        self.options.is_boolean = true;
        self
    }

    pub fn min(mut self, min: usize) -> Self {
        self.options.min_length = Some(min);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.options.max_length = Some(max);
        self
    }

    /// Truncate oversized strings to `max` instead of rejecting them.
    pub fn truncate(mut self) -> Self {
        self.options.should_truncate = true;
        self
    }

    pub fn lowercase(mut self) -> Self {
        self.options.to_lower = true;
        self
    }

    pub fn trim(mut self) -> Self {
        self.options.trim = true;
        self
    }

    /// Replace the message of any failure raised by the built validator.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.options.message = Some(message.into());
        self
    }

    /// Build the runnable validator.
    pub fn build(&self) -> Escape {
        Escape {
            atomic: Arc::clone(&self.atomic),
            options: self.options.clone(),
        }
    }
}

impl std::fmt::Debug for EscapeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscapeBuilder")
            .field("options", &self.options)
            .finish()
    }
}

/// A fully-built validator. Stateless; safe to apply concurrently.
#[derive(Clone)]
pub struct Escape {
    atomic: EscapeFn,
    options: EscapeOptions,
}

impl Escape {
    pub fn options(&self) -> &EscapeOptions {
        &self.options
    }

    /// Validate one field value. `None` models an absent field; `Ok(None)`
    /// means the key should be omitted from the validated output.
    pub fn apply(&self, value: Option<&Value>) -> ValidateResult<Option<Value>> {
        match self.run(value) {
            Ok(out) => Ok(out),
            Err(err) => match &self.options.message {
                Some(message) => Err(ValidationError {
                    field: err.field,
                    message: message.clone(),
                }),
                None => Err(err),
            },
        }
    }

    /// Validate a value that is known to be present.
    pub fn apply_value(&self, value: &Value) -> ValidateResult<Value> {
        match self.apply(Some(value))? {
            Some(out) => Ok(out),
            // Only reachable for optional validators fed an absent marker,
            // which cannot happen through this entry point.
            None => Ok(Value::Null),
        }
    }

    // The resolution order below is load-bearing: later checks assume earlier
    // ones did not already resolve the value.
    fn run(&self, value: Option<&Value>) -> ValidateResult<Option<Value>> {
        let o = &self.options;

        // 1. Optional and absent: omit the key.
        if value.is_none() && o.is_optional {
            return Ok(None);
        }

        // 2. Explicit null, allowed.
        if o.null_ok && matches!(value, Some(Value::Null)) {
            return Ok(Some(Value::Null));
        }

        // 3/4. Empty string resolves early, one way or the other.
        if let Some(Value::String(s)) = value {
            if s.is_empty() {
                if o.empty_string_ok || o.is_optional {
                    return Ok(Some(Value::String(String::new())));
                }
                return Err(ValidationError::new("expecting non-empty value"));
            }
        }

        // 5. Object coercion: accept a JSON-encoded object in string form.
        let coerced;
        let value = if o.is_object && !matches!(value, Some(Value::Object(_)) | Some(Value::Array(_))) {
            let parsed = match value {
                Some(Value::String(s)) => serde_json::from_str::<Value>(s)
                    .ok()
                    .filter(|v| v.is_object() || v.is_array()),
                _ => None,
            };
            match parsed {
                Some(v) => {
                    coerced = v;
                    Some(&coerced)
                }
                None => return Err(ValidationError::new("expecting an object")),
            }
        } else {
            value
        };

        // 6. Literal zero is a real value, not a missing one. Without this
        // branch the falsiness check below would reject it.
        if o.is_number {
            if let Some(Value::Number(n)) = value {
                if n.as_f64() == Some(0.0) {
                    return Ok(Some(Value::from(0)));
                }
            }
        }

        // 7. Required values must not be falsy.
        if !o.is_optional && is_falsy(value, o.is_boolean) {
            return Err(ValidationError::new("missing value"));
        }

        // 8/9. List shape checks.
        let items: Vec<&Value> = if o.list_of {
            match value {
                Some(Value::Array(items)) => {
                    if items.is_empty() {
                        if o.empty_list_ok {
                            return Ok(Some(Value::Array(Vec::new())));
                        }
                        return Err(ValidationError::new("list must not be empty"));
                    }
                    items.iter().collect()
                }
                _ => return Err(ValidationError::new("expecting a list")),
            }
        } else {
            match value {
                Some(v) => vec![v],
                None => return Err(ValidationError::new("missing value")),
            }
        };

        // 11. Fixed resource-exhaustion guard.
        if items.len() > MAX_BATCH_SIZE {
            return Err(ValidationError::new(format!(
                "too many elements, the maximum is {}",
                MAX_BATCH_SIZE
            )));
        }

        // 12. Escape each element, then enforce bounds on the result.
        let mut escaped = Vec::with_capacity(items.len());
        for item in items {
            let prepared = self.prepare(item);
            let out = match &prepared {
                Some(owned) => (self.atomic)(owned)?,
                None => (self.atomic)(item)?,
            };
            escaped.push(self.enforce_bounds(out)?);
        }

        // 13. Scalar or whole-list result.
        if o.list_of {
            Ok(Some(Value::Array(escaped)))
        } else {
            // Length 1 by construction in scalar mode.
            Ok(escaped.pop().map(Some).unwrap_or(None))
        }
    }

    /// Step 10 plus trimming: string normalization ahead of the atomic escape.
    fn prepare(&self, value: &Value) -> Option<Value> {
        let o = &self.options;
        if !o.to_lower && !o.trim {
            return None;
        }
        let s = value.as_str()?;
        let mut s = if o.trim { s.trim().to_string() } else { s.to_string() };
        if o.to_lower {
            s = s.to_lowercase();
        }
        Some(Value::String(s))
    }

    fn enforce_bounds(&self, value: Value) -> ValidateResult<Value> {
        let o = &self.options;
        match value {
            Value::String(s) => {
                let length = s.chars().count();
                if let Some(max) = o.max_length {
                    if length > max {
                        if o.should_truncate {
                            let truncated: String = s.chars().take(max).collect();
                            return self.check_min(truncated);
                        }
                        return Err(ValidationError::new(format!(
                            "value must be at most {} characters long",
                            max
                        )));
                    }
                }
                self.check_min(s)
            }
            Value::Object(_) | Value::Array(_) => {
                if let Some(max) = o.max_length {
                    let serialized = serde_json::to_string(&value)
                        .map_err(|_| ValidationError::new("value is not serializable"))?;
                    if serialized.len() > max {
                        return Err(ValidationError::new(format!(
                            "value must serialize to at most {} bytes",
                            max
                        )));
                    }
                }
                Ok(value)
            }
            other => Ok(other),
        }
    }

    fn check_min(&self, s: String) -> ValidateResult<Value> {
        if let Some(min) = self.options.min_length {
            if s.chars().count() < min {
                return Err(ValidationError::new(format!(
                    "value must be at least {} characters long",
                    min
                )));
            }
        }
        Ok(Value::String(s))
    }
}

impl std::fmt::Debug for Escape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Escape")
            .field("options", &self.options)
            .finish()
    }
}

fn is_falsy(value: Option<&Value>, is_boolean: bool) -> bool {
    match value {
        None => true,
        Some(Value::Null) => true,
        Some(Value::Bool(false)) => !is_boolean,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}
