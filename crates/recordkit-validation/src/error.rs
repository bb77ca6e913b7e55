//! Validation error types
//!
//! Failures are values carrying a human-readable message, optionally labeled
//! with the field they belong to. There is no structured error-code taxonomy:
//! callers classify failures into their own response scheme, and relationship
//! rule messages are intended to be shown to the end user verbatim.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of applying a validator: a conforming value or a single failure.
pub type ValidateResult<T> = Result<T, ValidationError>;

/// A single validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
pub struct ValidationError {
    /// The field the failure belongs to, when known.
    pub field: Option<String>,
    /// Human-readable error message.
    pub message: String,
}

impl ValidationError {
    /// Create a failure with no field label.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    /// Create a failure labeled with a field name.
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Attach a field label if the error does not already carry one.
    pub fn labeled(mut self, field: impl Into<String>) -> Self {
        if self.field.is_none() {
            self.field = Some(field.into());
        }
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Per-field collection of validation failures.
///
/// Used when a whole payload is validated at once: every failing field is
/// reported, not just the first one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Error)]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure under the field it belongs to.
    pub fn add(&mut self, field: impl Into<String>, error: ValidationError) {
        let field = field.into();
        self.errors
            .entry(field.clone())
            .or_default()
            .push(error.labeled(field));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one failure.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn field_errors(&self, field: &str) -> Option<&Vec<ValidationError>> {
        self.errors.get(field)
    }

    pub fn has_field_errors(&self, field: &str) -> bool {
        self.errors.get(field).is_some_and(|e| !e.is_empty())
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
    }

    /// Collapse into a result: `Ok` when nothing failed.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no validation errors");
        }
        write!(f, "validation failed for {} field(s):", self.errors.len())?;
        for errors in self.errors.values() {
            for error in errors {
                write!(f, "\n  {}", error)?;
            }
        }
        Ok(())
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        let field = error.field.clone().unwrap_or_else(|| "value".to_string());
        errors.add(field, error);
        errors
    }
}
