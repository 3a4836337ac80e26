//! Error taxonomy shared by every glyphh crate
//!
//! - ConfigurationError: bad schema, fatal, raised at construction time
//! - EncodingError: one attribute value cannot be canonicalised, recovered by the encoder
//! - SerializationError: corrupt or incompatible artifact, fatal on load
//! - QueryError: only surfaced in strict similarity mode; searches return empty results instead

use thiserror::Error;

/// Schema / construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("dimension must be greater than zero, got {0}")]
    InvalidDimension(usize),

    #[error("duplicate role '{role}' in segment '{layer}/{segment}'")]
    DuplicateRole {
        layer: String,
        segment: String,
        role: String,
    },

    #[error("duplicate segment '{segment}' in layer '{layer}'")]
    DuplicateSegment { layer: String, segment: String },

    #[error("duplicate layer '{0}'")]
    DuplicateLayer(String),

    #[error("negative weight {weight} on '{path}'")]
    NegativeWeight { path: String, weight: f64 },

    #[error("non-finite weight on '{0}'")]
    NonFiniteWeight(String),

    #[error("empty {0} name")]
    EmptyName(&'static str),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("beam width must be at least 1")]
    InvalidBeamWidth,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Attribute values that have no stable canonical token
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    #[error("number {0} has no canonical form")]
    NonFiniteNumber(f64),

    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
}

/// Artifact decoding / writing errors
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("invalid magic bytes")]
    InvalidMagic,

    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u32),

    #[error("artifact truncated")]
    Truncated,

    #[error("payload checksum mismatch")]
    ChecksumMismatch,

    #[error("codec error: {0}")]
    Codec(String),

    /// Decoded payload describes an invalid model
    #[error("invalid artifact content: {0}")]
    InvalidContent(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Query errors, only raised in strict mode
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("unknown edge type '{0}'")]
    UnknownEdgeType(String),

    #[error("top_k must be greater than zero")]
    InvalidTopK,

    #[error("model has no glyphs")]
    EmptyModel,
}

/// Top level error
#[derive(Debug, Error)]
pub enum GlyphhError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GlyphhError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_configuration_error_display() {
        let error = ConfigurationError::DuplicateRole {
            layer: "audit".to_string(),
            segment: "event".to_string(),
            role: "actor".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "duplicate role 'actor' in segment 'audit/event'"
        );
    }

    #[test]
    fn test_glyphh_error_wraps_source() {
        let error: GlyphhError = ConfigurationError::InvalidDimension(0).into();
        assert_eq!(
            error.to_string(),
            "configuration error: dimension must be greater than zero, got 0"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn test_serialization_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let error = SerializationError::from(io);
        assert!(matches!(error, SerializationError::Io(_)));
    }
}
