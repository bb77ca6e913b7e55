//! Schema assembly
//!
//! A [`Schema`] maps entity names to their [`Model`]s. It is assembled once,
//! synchronously, at process start; [`SchemaBuilder::build`] verifies that
//! every declared dependency and inherited-access target names a registered
//! entity, then the schema is immutable and safe for unbounded concurrent
//! reads.

use std::collections::BTreeMap;

use tracing::debug;

use crate::access::AccessRule;
use crate::dependency::OnDeletePolicy;
use crate::error::{SchemaError, SchemaResult};
use crate::model::Model;

#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    entities: BTreeMap<String, Model>,
    duplicate: Option<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, name: impl Into<String>, model: Model) -> Self {
        let name = name.into();
        if self.entities.contains_key(&name) && self.duplicate.is_none() {
            self.duplicate = Some(name.clone());
        }
        self.entities.insert(name, model);
        self
    }

    /// Verify cross-entity references and freeze the schema.
    pub fn build(self) -> SchemaResult<Schema> {
        if let Some(name) = self.duplicate {
            return Err(SchemaError::DuplicateEntity(name));
        }

        for (entity, model) in &self.entities {
            for (field, dependency) in model.dependencies() {
                for target in &dependency.depends_on {
                    if !self.entities.contains_key(target) {
                        return Err(SchemaError::UnknownDependencyTarget {
                            entity: entity.clone(),
                            field: field.to_string(),
                            target: target.clone(),
                        });
                    }
                }
            }
            for rule in &model.constraints.access {
                if let AccessRule::Dependency { entity: target, .. } = rule {
                    if !self.entities.contains_key(target) {
                        return Err(SchemaError::UnknownAccessTarget {
                            entity: entity.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
            debug!(
                entity = entity.as_str(),
                fields = model.fields.len(),
                "registered schema entity"
            );
        }

        Ok(Schema {
            entities: self.entities,
        })
    }
}

/// The full entity map the API exposes. Logically immutable after build.
#[derive(Clone, Debug)]
pub struct Schema {
    entities: BTreeMap<String, Model>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn entity(&self, name: &str) -> Option<&Model> {
        self.entities.get(name)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Every field across the schema that references `target`, with its
    /// deletion policy. This is the plan the external engine walks when a
    /// record of `target` is removed.
    pub fn dependents_of(&self, target: &str) -> Vec<DependentField<'_>> {
        let mut out = Vec::new();
        for (entity, model) in &self.entities {
            for (field, dependency) in model.dependencies() {
                if dependency.depends_on.iter().any(|name| name == target) {
                    out.push(DependentField {
                        entity,
                        field,
                        on_delete: dependency.on_delete,
                    });
                }
            }
        }
        out
    }
}

/// One field that references a given entity, as reported by
/// [`Schema::dependents_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependentField<'a> {
    pub entity: &'a str,
    pub field: &'a str,
    pub on_delete: OnDeletePolicy,
}
