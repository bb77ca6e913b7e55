//! Foreign-key dependency metadata
//!
//! A [`Dependency`] declares that a field's value references records of other
//! entities and what must happen when a referenced record is removed. The
//! external engine executes the policy; this module only describes it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the engine must do to a referencing record when the record it
/// references is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDeletePolicy {
    /// Cascade: delete the referencing record too.
    Delete,
    /// Remove the referencing value (drop a list element or map key).
    Unset,
    /// Null out the referencing field.
    SetNull,
    /// Do nothing automatically.
    Nop,
}

/// How the field refers to the foreign record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// The field holds the foreign record's id (or a list of ids).
    ForeignKey,
    /// The field holds a structured value that embeds foreign ids, such as a
    /// map keyed by foreign id.
    Value,
}

/// Enumerates every foreign id referenced by a structured field value. Needed
/// when the field is a map rather than an id or list of ids.
pub type DependentValuesFn = Arc<dyn Fn(&Value) -> Vec<String> + Send + Sync>;

/// Builds a datastore filter matching records that reference the given id.
pub type DependencyFilterFn = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// A declared reference from one field to records of other entities.
#[derive(Clone)]
pub struct Dependency {
    /// Candidate foreign entities, OR semantics: the value may legally
    /// reference any one of them (a sender id may be a staff user or an
    /// end-user).
    pub depends_on: Vec<String>,
    /// The field to match on the foreign side, usually its id.
    pub dependency_field: String,
    pub kind: DependencyKind,
    pub on_delete: OnDeletePolicy,
    pub get_dependent_values: Option<DependentValuesFn>,
    pub filter_by_dependency: Option<DependencyFilterFn>,
}

impl Dependency {
    /// A direct foreign-key reference with no automatic deletion handling.
    pub fn on(entities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            depends_on: entities.into_iter().map(Into::into).collect(),
            dependency_field: "id".to_string(),
            kind: DependencyKind::ForeignKey,
            on_delete: OnDeletePolicy::Nop,
            get_dependent_values: None,
            filter_by_dependency: None,
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.dependency_field = field.into();
        self
    }

    pub fn kind(mut self, kind: DependencyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn on_delete(mut self, policy: OnDeletePolicy) -> Self {
        self.on_delete = policy;
        self
    }

    pub fn dependent_values_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Vec<String> + Send + Sync + 'static,
    {
        self.get_dependent_values = Some(Arc::new(f));
        self
    }

    pub fn filter_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.filter_by_dependency = Some(Arc::new(f));
        self
    }

    /// Every foreign id referenced by `field_value`. Ids and lists of ids are
    /// handled directly; structured values use the declared hook.
    pub fn dependent_values(&self, field_value: &Value) -> Vec<String> {
        if let Some(hook) = &self.get_dependent_values {
            return hook(field_value);
        }
        match field_value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// A filter matching records whose field references `id`, for reverse
    /// "does anything reference this" lookups.
    pub fn reverse_filter(&self, field_name: &str, id: &str) -> Value {
        match &self.filter_by_dependency {
            Some(hook) => hook(id),
            None => serde_json::json!({ field_name: id }),
        }
    }
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependency")
            .field("depends_on", &self.depends_on)
            .field("dependency_field", &self.dependency_field)
            .field("kind", &self.kind)
            .field("on_delete", &self.on_delete)
            .field("has_dependent_values_fn", &self.get_dependent_values.is_some())
            .field("has_filter_fn", &self.filter_by_dependency.is_some())
            .finish()
    }
}
