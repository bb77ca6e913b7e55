//! Schema construction errors

use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Failures raised while assembling a schema at startup. Nothing here occurs
/// at request time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field dependency names an entity the schema does not contain.
    #[error("entity '{entity}' (field '{field}') depends on unknown entity '{target}'")]
    UnknownDependencyTarget {
        entity: String,
        field: String,
        target: String,
    },

    /// An access rule inherits access through an entity the schema does not
    /// contain.
    #[error("entity '{entity}' inherits access from unknown entity '{target}'")]
    UnknownAccessTarget { entity: String, target: String },

    /// The same entity name was registered twice.
    #[error("entity '{0}' is registered more than once")]
    DuplicateEntity(String),
}
