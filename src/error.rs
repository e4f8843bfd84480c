//! Error types for the schema library

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema library errors
///
/// `MalformedSchema` and `Serialization` are the only kinds the codec
/// produces. The remaining variants belong to the registry layer.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Schema not found: {name}")]
    NotFound { name: String },

    #[error("Invalid schema name: {0:?}")]
    InvalidName(String),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// True for errors raised while decoding a payload
    pub fn is_malformed(&self) -> bool {
        matches!(self, SchemaError::MalformedSchema(_))
    }
}
