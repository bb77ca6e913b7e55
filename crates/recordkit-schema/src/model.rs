//! Per-entity model
//!
//! A [`Model`] aggregates everything consumers need to enforce data integrity
//! for one entity without this crate performing any I/O: the field set with
//! validators, constraints, per-role action permissions, and side-effect
//! descriptors.

use std::collections::{BTreeMap, HashMap};

use recordkit_validation::{Escape, ValidationError};
use serde_json::{Map, Value};

use crate::access::access_granted;
use crate::actions::{ActionKind, CustomAction, SideEffect};
use crate::constraint::{Constraints, ResolvedDependencies};
use crate::dependency::Dependency;
use crate::field::{
    fields_to_validation, fields_to_validation_for_update, FieldInfo, FieldMap,
};
use crate::session::{CallerRole, Session};

/// One entity's declaration: fields, constraints, actions, side effects.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub fields: FieldMap,
    pub constraints: Constraints,
    /// CRUD operations the primary (staff) role may perform.
    pub default_actions: Vec<ActionKind>,
    pub custom_actions: Vec<CustomAction>,
    /// The narrower subset granted to the secondary (external) role. Empty
    /// means external callers get nothing on this entity.
    pub restricted_actions: Vec<ActionKind>,
    /// Jobs the external engine runs after successful mutations, keyed by the
    /// operation that triggers them.
    pub side_effects: BTreeMap<ActionKind, Vec<SideEffect>>,
}

impl Model {
    pub fn new() -> Self {
        Self {
            fields: FieldMap::new(),
            constraints: Constraints::new(),
            default_actions: ActionKind::DEFAULTS.to_vec(),
            custom_actions: Vec::new(),
            restricted_actions: Vec::new(),
            side_effects: BTreeMap::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, info: FieldInfo) -> Self {
        self.fields.insert(name.into(), info);
        self
    }

    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Replace the default CRUD action set.
    pub fn actions(mut self, actions: impl IntoIterator<Item = ActionKind>) -> Self {
        self.default_actions = actions.into_iter().collect();
        self
    }

    pub fn custom_action(mut self, action: CustomAction) -> Self {
        self.custom_actions.push(action);
        self
    }

    /// Grant the secondary role a subset of actions on this entity.
    pub fn restricted_actions(mut self, actions: impl IntoIterator<Item = ActionKind>) -> Self {
        self.restricted_actions = actions.into_iter().collect();
        self
    }

    pub fn side_effect(mut self, trigger: ActionKind, effect: SideEffect) -> Self {
        self.side_effects.entry(trigger).or_default().push(effect);
        self
    }

    /// Whether `role` may perform `action` on this entity.
    pub fn allows(&self, role: CallerRole, action: ActionKind) -> bool {
        match role {
            CallerRole::Staff => self.default_actions.contains(&action),
            CallerRole::External => self.restricted_actions.contains(&action),
        }
    }

    pub fn find_custom_action(&self, name: &str) -> Option<&CustomAction> {
        self.custom_actions.iter().find(|a| a.name == name)
    }

    /// Per-field validators for a create payload.
    pub fn validation(&self) -> HashMap<String, Escape> {
        fields_to_validation(&self.fields)
    }

    /// Per-field validators for an update payload.
    pub fn validation_for_update(&self) -> HashMap<String, Escape> {
        fields_to_validation_for_update(&self.fields)
    }

    /// Every declared field dependency, paired with its field name.
    pub fn dependencies(&self) -> impl Iterator<Item = (&str, &Dependency)> {
        self.fields.iter().flat_map(|(name, info)| {
            info.dependencies.iter().map(move |dep| (name.as_str(), dep))
        })
    }

    /// OR over the entity's access rules; permissive when none are declared.
    pub fn access_granted(
        &self,
        record: &Map<String, Value>,
        session: &Session,
        resolved: &ResolvedDependencies,
    ) -> bool {
        access_granted(&self.constraints.access, record, session, resolved)
    }

    /// Relationship rules in declaration order, first violation wins.
    pub fn check_relationships(
        &self,
        candidate: &Map<String, Value>,
        resolved: &ResolvedDependencies,
        session: &Session,
    ) -> Result<(), ValidationError> {
        self.constraints
            .check_relationships(candidate, resolved, session)
    }
}
