//! URL and MIME-type validators

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::error::ValidationError;
use crate::escape::EscapeBuilder;

/// An absolute http(s) URL.
pub fn url() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        let s = value
            .as_str()
            .ok_or_else(|| ValidationError::new("expecting a url"))?;
        let parsed = Url::parse(s).map_err(|_| ValidationError::new("expecting a valid url"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ValidationError::new("expecting an http or https url"));
        }
        Ok(Value::String(s.to_string()))
    })
    .trim()
    .max(2_000)
}

fn mime_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9!#$&^_.+-]{0,126}/[a-z0-9][a-z0-9!#$&^_.+-]{0,126}$")
            .expect("static pattern")
    })
}

/// A `type/subtype` MIME type, folded to lowercase.
pub fn mime_type() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        let s = value
            .as_str()
            .ok_or_else(|| ValidationError::new("expecting a mime type"))?;
        if mime_pattern().is_match(s) {
            Ok(Value::String(s.to_string()))
        } else {
            Err(ValidationError::new("expecting a valid mime type"))
        }
    })
    .trim()
    .lowercase()
}
