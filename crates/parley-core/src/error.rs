//! Error types for Parley core

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Decode and protocol errors
#[derive(Error, Debug)]
pub enum Error {
    /// A required field is absent from a wire payload
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field is present but of the wrong JSON type
    #[error("field {field} is not a {expected}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
    },

    /// Session description with an unrecognized type tag
    #[error("unknown sdp type: {0}")]
    UnknownSdpType(String),

    /// Named event this protocol does not speak
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// JSON parse error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
