//! Error types for schema generation and argv construction.
//!
//! Every failure is surfaced to the caller; nothing is recovered inside the
//! library. Classification and aggregation either fully succeed or return
//! one of these errors.

use thiserror::Error;

/// Errors raised while walking, classifying, aggregating, or constructing.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Strict typing is enabled and an argument's element type is not one of
    /// integer, float, or string.
    #[error("unknown type `{type_name}` for argument `{dest}`")]
    UnknownElementType { dest: String, type_name: String },

    /// The aggregation selector is not `none`, `group`, or `root`.
    #[error("invalid aggregate value: {0}")]
    InvalidAggregate(String),

    /// `construct` received an input key with no matching option.
    #[error("unknown option `{option}` for command `{path}`")]
    UnknownOption { path: String, option: String },

    /// `construct` received something other than a JSON object.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An include or exclude pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// File I/O failure while loading a definition or config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
