//! Uniqueness and relationship constraints
//!
//! Everything here is declarative or pure. Uniqueness against datastore state
//! is the external engine's job; this module evaluates what can be checked
//! without I/O (duplicates inside a candidate record, collisions against
//! records the engine already loaded) and carries the rest as metadata.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use recordkit_validation::{ValidationError, ValidationErrors};
use serde_json::{Map, Value};

use crate::access::AccessRule;
use crate::session::Session;

/// Foreign records the engine resolved ahead of rule evaluation, keyed by
/// entity name. Any I/O needed to produce these completes before a rule runs.
pub type ResolvedDependencies = HashMap<String, Vec<Value>>;

/// A per-tenant uniqueness declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UniqueRule {
    /// The named field's value must be unique.
    Field(String),
    /// Elements of the named array field must be mutually unique. With an
    /// `item_key`, two elements conflict exactly when their key sub-field
    /// values match, regardless of other differences; without one, whole
    /// elements are compared.
    ArrayItem {
        array: String,
        item_key: Option<String>,
    },
}

impl UniqueRule {
    pub fn field(name: impl Into<String>) -> Self {
        UniqueRule::Field(name.into())
    }

    pub fn array_by_key(array: impl Into<String>, item_key: impl Into<String>) -> Self {
        UniqueRule::ArrayItem {
            array: array.into(),
            item_key: Some(item_key.into()),
        }
    }

    /// Check for conflicts inside the candidate record itself. Only array
    /// rules can conflict within one record.
    pub fn conflicts_within(&self, candidate: &Map<String, Value>) -> Result<(), ValidationError> {
        let UniqueRule::ArrayItem { array, item_key } = self else {
            return Ok(());
        };
        let Some(Value::Array(items)) = candidate.get(array) else {
            return Ok(());
        };

        let mut seen: HashSet<String> = HashSet::new();
        for item in items {
            let probe = match item_key {
                Some(key) => match item.get(key) {
                    Some(v) => v,
                    // Elements without the key sub-field never conflict.
                    None => continue,
                },
                None => item,
            };
            let fingerprint = probe.to_string();
            if !seen.insert(fingerprint) {
                let what = match item_key {
                    Some(key) => format!("{} with the same {}", array, key),
                    None => format!("duplicate {} entries", array),
                };
                return Err(ValidationError::for_field(
                    array.clone(),
                    format!("duplicate {}", what),
                ));
            }
        }
        Ok(())
    }

    /// Check the candidate against already-loaded existing records of the
    /// same entity (the engine queries them; this compares).
    pub fn conflicts_against(
        &self,
        candidate: &Map<String, Value>,
        existing: &[Value],
    ) -> Result<(), ValidationError> {
        match self {
            UniqueRule::Field(name) => {
                let Some(value) = candidate.get(name) else {
                    return Ok(());
                };
                let taken = existing
                    .iter()
                    .any(|record| record.get(name.as_str()) == Some(value));
                if taken {
                    return Err(ValidationError::for_field(
                        name.clone(),
                        "value is already in use",
                    ));
                }
                Ok(())
            }
            UniqueRule::ArrayItem { array, item_key } => {
                let Some(Value::Array(items)) = candidate.get(array) else {
                    return Ok(());
                };
                let candidate_keys: HashSet<String> = items
                    .iter()
                    .filter_map(|item| match item_key {
                        Some(key) => item.get(key).map(|v| v.to_string()),
                        None => Some(item.to_string()),
                    })
                    .collect();
                for record in existing {
                    let Some(Value::Array(other)) = record.get(array.as_str()) else {
                        continue;
                    };
                    for item in other {
                        let probe = match item_key {
                            Some(key) => match item.get(key) {
                                Some(v) => v.to_string(),
                                None => continue,
                            },
                            None => item.to_string(),
                        };
                        if candidate_keys.contains(&probe) {
                            return Err(ValidationError::for_field(
                                array.clone(),
                                "value is already in use",
                            ));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

type RelationshipCheck = Arc<
    dyn Fn(&Map<String, Value>, &ResolvedDependencies, &Session) -> Result<(), ValidationError>
        + Send
        + Sync,
>;

/// An arbitrary cross-field business rule over the candidate record, the
/// resolved foreign records and the caller's session. The error message is
/// shown to the end user verbatim.
#[derive(Clone)]
pub struct RelationshipRule {
    name: String,
    check: Option<RelationshipCheck>,
}

impl RelationshipRule {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Map<String, Value>, &ResolvedDependencies, &Session) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            check: Some(Arc::new(check)),
        }
    }

    /// A rule that exists in the schema as documentation of an invariant
    /// enforced elsewhere. Evaluates to success; the name keeps the contract
    /// visible to consumers reading the model.
    pub fn declared_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            check: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(
        &self,
        candidate: &Map<String, Value>,
        resolved: &ResolvedDependencies,
        session: &Session,
    ) -> Result<(), ValidationError> {
        match &self.check {
            Some(check) => check(candidate, resolved, session),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for RelationshipRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipRule")
            .field("name", &self.name)
            .field("declared_only", &self.check.is_none())
            .finish()
    }
}

/// The full constraint set of one entity.
#[derive(Clone, Debug, Default)]
pub struct Constraints {
    /// Unique per tenant.
    pub unique: Vec<UniqueRule>,
    /// Unique across all tenants (login handles, global slugs).
    pub global_unique: Vec<String>,
    /// Ordered cross-field rules, evaluated in declaration order.
    pub relationship: Vec<RelationshipRule>,
    /// OR'd access rules; empty means tenant-wide access.
    pub access: Vec<AccessRule>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique(mut self, rule: UniqueRule) -> Self {
        self.unique.push(rule);
        self
    }

    pub fn global_unique(mut self, field: impl Into<String>) -> Self {
        self.global_unique.push(field.into());
        self
    }

    pub fn relationship(mut self, rule: RelationshipRule) -> Self {
        self.relationship.push(rule);
        self
    }

    pub fn access(mut self, rule: AccessRule) -> Self {
        self.access.push(rule);
        self
    }

    /// Run every intra-record uniqueness check, reporting all failures.
    pub fn check_unique_within(
        &self,
        candidate: &Map<String, Value>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for rule in &self.unique {
            if let Err(error) = rule.conflicts_within(candidate) {
                let field = error.field.clone().unwrap_or_else(|| "value".to_string());
                errors.add(field, error);
            }
        }
        errors.into_result()
    }

    /// Run the relationship rules in declaration order, stopping at the
    /// first violation.
    pub fn check_relationships(
        &self,
        candidate: &Map<String, Value>,
        resolved: &ResolvedDependencies,
        session: &Session,
    ) -> Result<(), ValidationError> {
        for rule in &self.relationship {
            rule.evaluate(candidate, resolved, session)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn array_by_key_flags_equal_keys_only() {
        let rule = UniqueRule::array_by_key("states", "name");

        // Equal names conflict regardless of other sub-field differences.
        let dup = record(json!({"states": [
            {"name": "A", "color": "red"},
            {"name": "A", "color": "blue"}
        ]}));
        assert!(rule.conflicts_within(&dup).is_err());

        // Distinct names never conflict.
        let ok = record(json!({"states": [
            {"name": "A", "color": "red"},
            {"name": "B", "color": "red"}
        ]}));
        assert!(rule.conflicts_within(&ok).is_ok());
    }

    #[test]
    fn simple_field_rules_have_no_intra_record_conflicts() {
        let rule = UniqueRule::field("email");
        let rec = record(json!({"email": "a@b.co"}));
        assert!(rule.conflicts_within(&rec).is_ok());
    }

    #[test]
    fn field_rule_detects_collisions_against_loaded_records() {
        let rule = UniqueRule::field("email");
        let candidate = record(json!({"email": "a@b.co"}));
        let existing = vec![json!({"email": "a@b.co"})];
        assert!(rule.conflicts_against(&candidate, &existing).is_err());
        assert!(rule.conflicts_against(&candidate, &[]).is_ok());
    }

    #[test]
    fn array_rule_detects_collisions_against_loaded_records() {
        let rule = UniqueRule::array_by_key("states", "name");
        let candidate = record(json!({"states": [{"name": "A"}]}));
        let existing = vec![json!({"states": [{"name": "A", "color": "red"}]})];
        assert!(rule.conflicts_against(&candidate, &existing).is_err());

        let disjoint = vec![json!({"states": [{"name": "B"}]})];
        assert!(rule.conflicts_against(&candidate, &disjoint).is_ok());
    }

    #[test]
    fn relationship_rules_run_in_order_and_carry_verbatim_messages() {
        let constraints = Constraints::new().relationship(RelationshipRule::new(
            "contact_method_required",
            |candidate, _resolved, _session| {
                if candidate.contains_key("email") || candidate.contains_key("phone") {
                    Ok(())
                } else {
                    Err(ValidationError::new("One of email or phone is required"))
                }
            },
        ));

        let session = Session::staff("u1", "t1");
        let resolved = ResolvedDependencies::new();

        let ok = record(json!({"email": "a@b.co"}));
        assert!(constraints.check_relationships(&ok, &resolved, &session).is_ok());

        let err = constraints
            .check_relationships(&record(json!({})), &resolved, &session)
            .unwrap_err();
        assert_eq!(err.message, "One of email or phone is required");
    }

    #[test]
    fn declared_only_rules_evaluate_to_success() {
        let rule = RelationshipRule::declared_only("unique_event_action");
        let session = Session::staff("u1", "t1");
        assert!(rule
            .evaluate(&record(json!({})), &ResolvedDependencies::new(), &session)
            .is_ok());
        assert_eq!(rule.name(), "unique_event_action");
    }

    #[test]
    fn check_unique_within_reports_all_violations() {
        let constraints = Constraints::new()
            .unique(UniqueRule::array_by_key("states", "name"))
            .unique(UniqueRule::array_by_key("steps", "id"));

        let candidate = record(json!({
            "states": [{"name": "A"}, {"name": "A"}],
            "steps": [{"id": 1}, {"id": 1}]
        }));
        let errors = constraints.check_unique_within(&candidate).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
