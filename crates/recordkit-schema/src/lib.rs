//! # recordkit-schema
//!
//! Declarative per-entity schema and constraint model for the recordkit
//! framework. An entity's [`Model`] pairs every field with a validator from
//! `recordkit-validation` plus the metadata an external rules/persistence
//! engine needs to enforce data integrity: uniqueness rules, cross-field
//! relationship rules, access rules, foreign-key dependencies with cascading
//! deletion policies, and per-operation action definitions.
//!
//! This crate only *declares* the rules. It performs no I/O: relationship and
//! access evaluators receive already-resolved foreign records as arguments,
//! and side effects are names and descriptions, never executable jobs. A
//! [`Schema`] is built once at process start and is immutable afterward, so
//! it is safe for unbounded concurrent reads.

pub mod access;
pub mod actions;
pub mod constraint;
pub mod dependency;
pub mod envelope;
pub mod error;
pub mod field;
pub mod model;
pub mod schema;
pub mod session;

pub use access::AccessRule;
pub use actions::{ActionKind, CustomAction, HttpMethod, SideEffect};
pub use constraint::{Constraints, RelationshipRule, ResolvedDependencies, UniqueRule};
pub use dependency::{Dependency, DependencyKind, OnDeletePolicy};
pub use envelope::{AutomationEnvelope, EventEnvelope};
pub use error::{SchemaError, SchemaResult};
pub use field::{
    apply_initializers, fields_to_validation, fields_to_validation_for_update, validate_payload,
    FieldInfo, FieldMap,
};
pub use model::Model;
pub use schema::{Schema, SchemaBuilder};
pub use session::{CallerRole, Session};
