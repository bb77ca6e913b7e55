//! Phone number validator
//!
//! Input is normalized before the format check: everything except digits and
//! a leading `+` is stripped, and bare 10-digit national numbers get the
//! default country code prefixed. Output is E.164 formatted.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ValidationError;
use crate::escape::EscapeBuilder;

const DEFAULT_COUNTRY_CODE: &str = "+1";

fn e164_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+[1-9][0-9]{9,14}$").expect("static pattern"))
}

/// A phone number in any common written form, normalized to E.164.
pub fn phone() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        let s = value
            .as_str()
            .ok_or_else(|| ValidationError::new("expecting a phone number"))?;

        let has_plus = s.trim_start().starts_with('+');
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();

        let normalized = if has_plus {
            format!("+{}", digits)
        } else if digits.len() == 10 {
            format!("{}{}", DEFAULT_COUNTRY_CODE, digits)
        } else {
            format!("+{}", digits)
        };

        if e164_pattern().is_match(&normalized) {
            Ok(Value::String(normalized))
        } else {
            Err(ValidationError::new("expecting a valid phone number"))
        }
    })
    .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_ten_digits_get_the_default_country_code() {
        let escape = phone().build();
        assert_eq!(
            escape.apply(Some(&json!("4155551234"))).unwrap(),
            Some(json!("+14155551234"))
        );
    }

    #[test]
    fn formatted_input_is_normalized() {
        let escape = phone().build();
        assert_eq!(
            escape.apply(Some(&json!("(415) 555-1234"))).unwrap(),
            Some(json!("+14155551234"))
        );
        assert_eq!(
            escape.apply(Some(&json!("+44 20 7946 0958"))).unwrap(),
            Some(json!("+442079460958"))
        );
    }

    #[test]
    fn short_numbers_are_rejected() {
        let escape = phone().build();
        assert!(escape.apply(Some(&json!("123"))).is_err());
        assert!(escape.apply(Some(&json!("555-1234"))).is_err());
    }

    #[test]
    fn leading_zero_country_codes_are_rejected() {
        let escape = phone().build();
        assert!(escape.apply(Some(&json!("+0123456789012"))).is_err());
    }

    #[test]
    fn phone_validation_is_idempotent() {
        let escape = phone().build();
        let once = escape.apply(Some(&json!("415-555-1234"))).unwrap().unwrap();
        let twice = escape.apply(Some(&once)).unwrap().unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, json!("+14155551234"));
    }

    #[test]
    fn non_strings_are_rejected() {
        let escape = phone().build();
        assert!(escape.apply(Some(&json!(4155551234u64))).is_err());
    }
}
