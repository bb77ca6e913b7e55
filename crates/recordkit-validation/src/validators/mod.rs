//! Built-in domain validators
//!
//! Each function returns an [`crate::escape::EscapeBuilder`] pre-configured
//! for its domain; call sites clone and reconfigure (optional, list, bounds)
//! before building.

pub mod boolean;
pub mod custom_fields;
pub mod datetime;
pub mod email;
pub mod net;
pub mod numeric;
pub mod phone;
pub mod strings;

pub use boolean::{boolean, boolean_coerced};
pub use custom_fields::custom_fields;
pub use datetime::date;
pub use email::email;
pub use net::{mime_type, url};
pub use numeric::{number, number_coerced, number_in_range};
pub use phone::phone;
pub use strings::{
    base64_token, bounded_string, object_id, person_name, string_long, string_medium, string_short,
};
