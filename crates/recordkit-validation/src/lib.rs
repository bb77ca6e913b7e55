//! # recordkit-validation
//!
//! Runtime value validation and escaping for the recordkit framework.
//! Untrusted, loosely-typed JSON input goes in; bounded, normalized values
//! come out, or the whole call fails with a human-readable message.
//!
//! The engine is built from three layers:
//! - [`escape`]: the core [`EscapeBuilder`] / [`Escape`] pair that wraps an
//!   atomic transform with optionality, nullability, bounds, truncation,
//!   list handling and a fixed batch cap,
//! - [`combinators`]: object, list, union, enumeration and map composition,
//! - [`validators`]: the concrete domain validators (strings, email, phone,
//!   url, mime type, identifiers, dates, numbers, booleans, tokens, custom
//!   field maps).
//!
//! Everything here is synchronous and side-effect free: validators never log,
//! never retry and never touch shared state, so any number of validations may
//! run in parallel.

pub mod combinators;
pub mod error;
pub mod escape;
pub mod validators;

pub use combinators::{
    binary_or_validator, exact_match_list_validator, exact_match_validator, indexable_validator,
    list_validator, list_validator_empty_ok, object_validator, or_validator,
};
pub use error::{ValidateResult, ValidationError, ValidationErrors};
pub use escape::{Escape, EscapeBuilder, EscapeFn, EscapeOptions, MAX_BATCH_SIZE};
