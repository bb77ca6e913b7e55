//! Date validator

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::error::ValidationError;
use crate::escape::EscapeBuilder;

/// A date or instant: RFC 3339 strings, `YYYY-MM-DD` dates, or epoch
/// milliseconds. Normalized to an RFC 3339 UTC string.
pub fn date() -> EscapeBuilder {
    EscapeBuilder::new(|value| {
        let instant: DateTime<Utc> = match value {
            Value::String(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    dt.with_timezone(&Utc)
                } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    match d.and_hms_opt(0, 0, 0) {
                        Some(dt) => Utc.from_utc_datetime(&dt),
                        None => return Err(ValidationError::new("expecting a valid date")),
                    }
                } else {
                    return Err(ValidationError::new("expecting a valid date"));
                }
            }
            Value::Number(n) => match n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()) {
                Some(dt) => dt,
                None => return Err(ValidationError::new("expecting a valid date")),
            },
            _ => return Err(ValidationError::new("expecting a date")),
        };
        Ok(Value::String(
            instant.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        ))
    })
    .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rfc3339_strings_are_normalized_to_utc() {
        let escape = date().build();
        assert_eq!(
            escape.apply(Some(&json!("2024-03-01T12:00:00+02:00"))).unwrap(),
            Some(json!("2024-03-01T10:00:00.000Z"))
        );
    }

    #[test]
    fn bare_dates_are_accepted() {
        let escape = date().build();
        assert_eq!(
            escape.apply(Some(&json!("2024-03-01"))).unwrap(),
            Some(json!("2024-03-01T00:00:00.000Z"))
        );
    }

    #[test]
    fn epoch_millis_are_accepted() {
        let escape = date().build();
        assert_eq!(
            escape.apply(Some(&json!(1_700_000_000_000u64))).unwrap(),
            Some(json!("2023-11-14T22:13:20.000Z"))
        );
    }

    #[test]
    fn garbage_is_rejected() {
        let escape = date().build();
        assert!(escape.apply(Some(&json!("yesterday"))).is_err());
        assert!(escape.apply(Some(&json!(true))).is_err());
    }

    #[test]
    fn date_validation_is_idempotent() {
        let escape = date().build();
        let once = escape
            .apply(Some(&json!("2024-03-01T12:00:00+02:00")))
            .unwrap()
            .unwrap();
        let twice = escape.apply(Some(&once)).unwrap().unwrap();
        assert_eq!(once, twice);
    }
}
