//! Per-field metadata and the field-map to validator-map bridge

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use recordkit_validation::{Escape, EscapeBuilder, ValidationError, ValidationErrors};
use serde_json::{Map, Value};

use crate::dependency::Dependency;
use crate::session::Session;

/// Computes a field's default from the already-validated sibling fields and
/// the caller's session. Runs at creation time only.
pub type Initializer = Arc<dyn Fn(&Map<String, Value>, &Session) -> Option<Value> + Send + Sync>;

/// One persisted attribute of an entity: its validator plus enforcement
/// metadata.
#[derive(Clone)]
pub struct FieldInfo {
    pub validator: EscapeBuilder,
    /// Never settable by a caller; the engine writes it.
    pub readonly: bool,
    /// Must be present on creation.
    pub required: bool,
    /// Settable at creation only.
    pub updates_disabled: bool,
    /// Example values, used to synthesize test fixtures.
    pub examples: Vec<Value>,
    pub initializer: Option<Initializer>,
    pub dependencies: Vec<Dependency>,
}

impl FieldInfo {
    pub fn new(validator: EscapeBuilder) -> Self {
        Self {
            validator,
            readonly: false,
            required: false,
            updates_disabled: false,
            examples: Vec::new(),
            initializer: None,
            dependencies: Vec::new(),
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn updates_disabled(mut self) -> Self {
        self.updates_disabled = true;
        self
    }

    pub fn example(mut self, value: Value) -> Self {
        self.examples.push(value);
        self
    }

    pub fn initializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Map<String, Value>, &Session) -> Option<Value> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(f));
        self
    }

    pub fn dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

impl std::fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldInfo")
            .field("readonly", &self.readonly)
            .field("required", &self.required)
            .field("updates_disabled", &self.updates_disabled)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// The full attribute set of an entity, keyed by field name.
pub type FieldMap = BTreeMap<String, FieldInfo>;

/// Flatten a field map into per-field validators for a create payload.
///
/// Readonly fields are excluded entirely: a caller can never set them.
/// Required fields get strict validators; everything else is optional.
pub fn fields_to_validation(fields: &FieldMap) -> HashMap<String, Escape> {
    fields
        .iter()
        .filter(|(_, info)| !info.readonly)
        .map(|(name, info)| {
            let builder = info.validator.clone();
            let builder = if info.required {
                builder.required()
            } else {
                builder.optional()
            };
            (name.clone(), builder.build())
        })
        .collect()
}

/// Flatten a field map into per-field validators for an update payload.
///
/// Updates never require a field to be present, and fields settable at
/// creation only are excluded along with readonly ones.
pub fn fields_to_validation_for_update(fields: &FieldMap) -> HashMap<String, Escape> {
    fields
        .iter()
        .filter(|(_, info)| !info.readonly && !info.updates_disabled)
        .map(|(name, info)| (name.clone(), info.validator.clone().optional().build()))
        .collect()
}

/// Validate a whole payload against a validator map, reporting every failing
/// field. Unknown keys are rejected by name, all of them in one pass.
pub fn validate_payload(
    validation: &HashMap<String, Escape>,
    payload: &Map<String, Value>,
) -> Result<Map<String, Value>, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let mut unexpected: Vec<&str> = payload
        .keys()
        .filter(|key| !validation.contains_key(*key))
        .map(String::as_str)
        .collect();
    unexpected.sort_unstable();
    for key in unexpected {
        errors.add(key, ValidationError::new("unexpected field"));
    }

    let mut out = Map::new();
    for (name, escape) in validation {
        match escape.apply(payload.get(name)) {
            Ok(Some(value)) => {
                out.insert(name.clone(), value);
            }
            Ok(None) => {}
            Err(error) => errors.add(name.clone(), error),
        }
    }

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

/// Fill in defaults for absent fields from their initializers. Runs over the
/// already-validated candidate record, at creation time only.
pub fn apply_initializers(fields: &FieldMap, candidate: &mut Map<String, Value>, session: &Session) {
    // Initializers read validated siblings, so snapshot the candidate before
    // any default lands.
    let snapshot = candidate.clone();
    for (name, info) in fields {
        if candidate.contains_key(name) {
            continue;
        }
        if let Some(initializer) = &info.initializer {
            if let Some(value) = initializer(&snapshot, session) {
                candidate.insert(name.clone(), value);
            }
        }
    }
}
