use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by an object transport.
///
/// Every engine operation fails with this type. The engine never wraps or
/// reclassifies it, so the caller sees exactly what the transport produced.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{operation} failed: {source}")]
    Sdk {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no such key: {0}")]
    NoSuchKey(String),

    #[error("failed to read object body: {0}")]
    Body(#[from] io::Error),

    #[error("invalid presigning options: {0}")]
    Presign(String),

    #[error("store refused to delete {} key(s): {}", .0.len(), .0.join(", "))]
    PartialDelete(Vec<String>),

    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("{0} is not supported by this engine")]
    Unsupported(&'static str),

    #[error("{0} requires a non-empty key")]
    EmptyKey(&'static str),
}

impl TransportError {
    pub fn sdk(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Sdk {
            operation,
            source: source.into(),
        }
    }

    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchKey(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("bucket must not be empty")]
    MissingBucket,

    #[error("unknown canned ACL `{0}`")]
    InvalidAcl(String),

    #[error("unknown directory prefix mode `{0}` (expected `versions` or `key`)")]
    InvalidDirectoryPrefix(String),
}
