//! Action vocabulary and side-effect descriptors

use serde::{Deserialize, Serialize};

use crate::field::FieldMap;

/// The CRUD vocabulary entities enable operations from. Custom actions reuse
/// it as their access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Read,
    Update,
    Delete,
    CreateMany,
    ReadMany,
}

impl ActionKind {
    /// The default action set for a newly declared entity.
    pub const DEFAULTS: [ActionKind; 5] = [
        ActionKind::Create,
        ActionKind::Read,
        ActionKind::Update,
        ActionKind::Delete,
        ActionKind::ReadMany,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// An entity-specific operation beyond plain CRUD, with its own parameter and
/// return schemas.
#[derive(Clone, Debug)]
pub struct CustomAction {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    /// Validated like a create payload, against this map instead of the
    /// entity's fields.
    pub params: FieldMap,
    /// Shape of the response body.
    pub returns: FieldMap,
    /// Access level borrowed from the CRUD vocabulary: an action marked
    /// `Update` is available to whoever could update the record.
    pub access: ActionKind,
}

impl CustomAction {
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            params: FieldMap::new(),
            returns: FieldMap::new(),
            access: ActionKind::Update,
        }
    }

    pub fn params(mut self, params: FieldMap) -> Self {
        self.params = params;
        self
    }

    pub fn returns(mut self, returns: FieldMap) -> Self {
        self.returns = returns;
        self
    }

    pub fn access(mut self, access: ActionKind) -> Self {
        self.access = access;
        self
    }
}

/// A named, described asynchronous job the external engine must run after a
/// successful mutation. Metadata only; nothing here is executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffect {
    pub name: String,
    pub description: String,
}

impl SideEffect {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
