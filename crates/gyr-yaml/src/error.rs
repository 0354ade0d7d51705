//! Error types for the YAML boundary.

use thiserror::Error;

/// Errors raised while decoding or encoding YAML streams.
#[derive(Debug, Error)]
pub enum YamlError {
    /// The input stream is not well-formed YAML.
    #[error("parse yaml: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// A document could not be serialized back out.
    #[error("emit yaml: {0}")]
    Emit(#[source] serde_yaml::Error),

    /// The stream carries a YAML tag the tree model does not represent.
    #[error("unsupported yaml tag {tag}")]
    UnsupportedTag { tag: String },

    /// Two sibling mapping entries encode to the same key.
    #[error("duplicate mapping key {key}")]
    DuplicateKey { key: String },

    /// I/O error on an anonymous reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A named input file could not be opened or read.
    #[error("read '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for YAML codec operations.
pub type YamlResult<T> = Result<T, YamlError>;
