//! Outbound delivery envelopes
//!
//! Event notifications handed to third parties carry an integrity digest so
//! the receiver can verify authenticity against the tenant's shared secret.
//! Only construction and verification live here; delivery is transport-layer
//! work.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// A change notification for one entity: the affected records plus anything
/// the receiver needs for context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub entity: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub records: Vec<Value>,
    /// Epoch milliseconds at emission time.
    pub timestamp: i64,
    /// Hex sha256 over the concatenated record ids, the timestamp and the
    /// shared secret.
    pub integrity: String,
    pub related_records: Vec<Value>,
}

impl EventEnvelope {
    pub fn new(
        entity: impl Into<String>,
        kind: impl Into<String>,
        records: Vec<Value>,
        related_records: Vec<Value>,
        timestamp: i64,
        secret: &str,
    ) -> Self {
        let integrity = digest(&record_ids(&records), timestamp, secret);
        Self {
            entity: entity.into(),
            kind: kind.into(),
            records,
            timestamp,
            integrity,
            related_records,
        }
    }

    /// Recompute the digest and compare; a mismatch means the payload was
    /// altered or signed with a different secret.
    pub fn verify(&self, secret: &str) -> bool {
        self.integrity == digest(&record_ids(&self.records), self.timestamp, secret)
    }
}

/// The simpler envelope for rule-engine-triggered notifications: a message
/// instead of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub timestamp: i64,
    pub integrity: String,
}

impl AutomationEnvelope {
    pub fn new(message: impl Into<String>, timestamp: i64, secret: &str) -> Self {
        let message = message.into();
        let integrity = digest(&message, timestamp, secret);
        Self {
            kind: "automation".to_string(),
            message,
            timestamp,
            integrity,
        }
    }

    pub fn verify(&self, secret: &str) -> bool {
        self.integrity == digest(&self.message, self.timestamp, secret)
    }
}

fn record_ids(records: &[Value]) -> String {
    records
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_str))
        .collect()
}

fn digest(payload: &str, timestamp: i64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
