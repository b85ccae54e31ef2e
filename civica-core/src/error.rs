//! Error types shared across the Civica client crates.

use thiserror::Error;

/// Shape validation failures for domain values.
///
/// The session controller treats these as "value absent" rather than
/// surfacing them; they only propagate where a caller constructs a value
/// directly (config, tests, API responses).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid record identifier: {value:?}")]
    InvalidIdentifier { value: String },

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}
