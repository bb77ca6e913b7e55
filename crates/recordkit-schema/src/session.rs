//! Caller session

use serde::{Deserialize, Serialize};

/// The trust level of the caller behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    /// Primary role: staff users of the tenant.
    Staff,
    /// Secondary, lower-trust role: external users granted a narrower set of
    /// actions per entity.
    External,
}

/// The authenticated caller a validation or constraint evaluation runs for.
///
/// Plain data; resolving it from a token or cookie is the transport layer's
/// job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Id of the calling user.
    pub caller_id: String,
    /// The tenant scope every per-tenant rule applies within.
    pub tenant_id: String,
    pub role: CallerRole,
}

impl Session {
    pub fn staff(caller_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            tenant_id: tenant_id.into(),
            role: CallerRole::Staff,
        }
    }

    pub fn external(caller_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            tenant_id: tenant_id.into(),
            role: CallerRole::External,
        }
    }
}
