//! String-shaped validators: bounded text, person names, identifiers, tokens

use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use regex::Regex;
use serde_json::Value;

use crate::error::ValidationError;
use crate::escape::EscapeBuilder;

/// A plain string bounded to `max` characters.
pub fn bounded_string(max: usize) -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        value
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| ValidationError::new("expecting a string"))
    })
    .max(max)
}

/// Short free text: titles, labels, names of things. 100 characters.
pub fn string_short() -> EscapeBuilder {
    bounded_string(100)
}

/// Medium free text: descriptions, message bodies. 1,000 characters.
pub fn string_medium() -> EscapeBuilder {
    bounded_string(1_000)
}

/// Long free text: rich notes, templates. 10,000 characters.
pub fn string_long() -> EscapeBuilder {
    bounded_string(10_000)
}

fn name_disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{M}0-9 .'-]").expect("static pattern"))
}

/// A person's name: disallowed characters stripped, first letter capitalized.
pub fn person_name() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        let s = value
            .as_str()
            .ok_or_else(|| ValidationError::new("expecting a name"))?;
        let cleaned = name_disallowed().replace_all(s, "");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(ValidationError::new("expecting a name"));
        }
        let mut chars = cleaned.chars();
        let first = chars.next().map(|c| c.to_uppercase().collect::<String>());
        let rest: String = chars.collect();
        match first {
            Some(first) => Ok(Value::String(format!("{}{}", first, rest))),
            None => Err(ValidationError::new("expecting a name")),
        }
    })
    .trim()
    .max(100)
}

fn object_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-f]{24}$").expect("static pattern"))
}

/// A 24-character lowercase hex record identifier.
pub fn object_id() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        let s = value
            .as_str()
            .ok_or_else(|| ValidationError::new("expecting an id"))?;
        if object_id_pattern().is_match(s) {
            Ok(Value::String(s.to_string()))
        } else {
            Err(ValidationError::new("expecting a valid id"))
        }
    })
    .lowercase()
    .trim()
}

/// A URL-safe base64 token (unpadded alphabet).
pub fn base64_token() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        let s = value
            .as_str()
            .ok_or_else(|| ValidationError::new("expecting a token"))?;
        if URL_SAFE_NO_PAD.decode(s).is_err() {
            return Err(ValidationError::new("expecting a base64 token"));
        }
        Ok(Value::String(s.to_string()))
    })
    .trim()
    .max(512)
}
