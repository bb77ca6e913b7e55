//! Access rules
//!
//! Access is permissive by default: an entity with no declared rules is
//! readable by any authenticated caller in the same tenant. Declared rules
//! are OR'd, so any one rule granting access is sufficient. Evaluation is
//! pure: foreign records needed by [`AccessRule::Dependency`] arrive already
//! loaded (and already access-filtered) from the external engine.

use serde_json::{Map, Value};

use crate::constraint::ResolvedDependencies;
use crate::session::Session;

/// Field conventionally holding the id of the record's creator.
pub const CREATED_BY_FIELD: &str = "created_by";

/// Field conventionally holding the record's tenant scope.
pub const TENANT_FIELD: &str = "tenant_id";

#[derive(Clone, Debug)]
pub enum AccessRule {
    /// Only the record's creator may access it.
    CreatorOnly,
    /// The caller's id must appear in the named field, either as its direct
    /// value or as a member of a list value.
    Filter(String),
    /// Access is inherited transitively through a reference: the caller may
    /// access this record if they may access a linked record of `entity`
    /// (access to a message follows access to its parent room).
    Dependency {
        /// The foreign entity access is inherited from.
        entity: String,
        /// The matching field on the foreign record, usually its id.
        foreign_field: String,
        /// The field on this record holding the reference.
        access_field: String,
    },
}

impl AccessRule {
    pub fn filter(field: impl Into<String>) -> Self {
        AccessRule::Filter(field.into())
    }

    pub fn dependency(
        entity: impl Into<String>,
        foreign_field: impl Into<String>,
        access_field: impl Into<String>,
    ) -> Self {
        AccessRule::Dependency {
            entity: entity.into(),
            foreign_field: foreign_field.into(),
            access_field: access_field.into(),
        }
    }

    /// Whether this single rule grants the caller access to `record`.
    pub fn grants(
        &self,
        record: &Map<String, Value>,
        session: &Session,
        resolved: &ResolvedDependencies,
    ) -> bool {
        match self {
            AccessRule::CreatorOnly => {
                record.get(CREATED_BY_FIELD).and_then(Value::as_str)
                    == Some(session.caller_id.as_str())
            }
            AccessRule::Filter(field) => match record.get(field) {
                Some(Value::String(s)) => s == &session.caller_id,
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|v| v.as_str() == Some(session.caller_id.as_str())),
                _ => false,
            },
            AccessRule::Dependency {
                entity,
                foreign_field,
                access_field,
            } => {
                let Some(reference) = record.get(access_field) else {
                    return false;
                };
                let Some(foreign_records) = resolved.get(entity) else {
                    return false;
                };
                foreign_records.iter().any(|foreign| {
                    foreign
                        .as_object()
                        .and_then(|f| f.get(foreign_field))
                        .is_some_and(|id| match reference {
                            Value::Array(refs) => refs.contains(id),
                            other => other == id,
                        })
                })
            }
        }
    }
}

/// Evaluate an entity's rule list: tenant scope first, then OR over the
/// declared rules, permissive when none are declared.
pub fn access_granted(
    rules: &[AccessRule],
    record: &Map<String, Value>,
    session: &Session,
    resolved: &ResolvedDependencies,
) -> bool {
    // Tenant isolation precedes every rule.
    if let Some(tenant) = record.get(TENANT_FIELD).and_then(Value::as_str) {
        if tenant != session.tenant_id {
            return false;
        }
    }
    if rules.is_empty() {
        return true;
    }
    rules.iter().any(|rule| rule.grants(record, session, resolved))
}
