//! Email address validator

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ValidationError;
use crate::escape::EscapeBuilder;

// Simplified ASCII pattern; catches the common cases without trying to be a
// full RFC 5322 parser.
fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([a-z0-9._%+-]*[a-z0-9])?@[a-z0-9]([a-z0-9.-]*[a-z0-9])?\.[a-z]{2,}$")
            .expect("static pattern")
    })
}

/// An email address, folded to lowercase before the format check.
pub fn email() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        let s = value
            .as_str()
            .ok_or_else(|| ValidationError::new("expecting an email address"))?;
        let folded = s.to_lowercase();

        let (local, domain) = folded
            .split_once('@')
            .ok_or_else(|| ValidationError::new("expecting a valid email address"))?;
        // RFC 5321 length limits.
        if local.is_empty() || local.len() > 64 || domain.is_empty() || domain.len() > 255 {
            return Err(ValidationError::new("expecting a valid email address"));
        }
        if !email_pattern().is_match(&folded) {
            return Err(ValidationError::new("expecting a valid email address"));
        }
        Ok(Value::String(folded))
    })
    .trim()
    .lowercase()
    .max(254)
}
