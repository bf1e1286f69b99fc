//! Error types shared across the loading pipeline.

use thiserror::Error;

use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::sharing::ResourceKind;

/// Result type for instantiation operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors raised while materializing a single item.
///
/// These never abort a load pass. The orchestrator catches them at the
/// candidate boundary, records them in the diagnostic report and moves on.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// Candidate or style metadata could not be decoded.
    #[error("malformed metadata in {asset}: {source}")]
    Metadata {
        asset: String,
        #[source]
        source: CodecError,
    },

    /// A prefab or resource payload could not be decoded.
    #[error("malformed payload in {asset}: {source}")]
    Payload {
        asset: String,
        #[source]
        source: CodecError,
    },

    /// The object asset named by a metadata record does not exist.
    #[error("asset {0} has no object payload")]
    MissingObject(String),

    /// A checksum-addressed sub-resource is missing from the pool.
    #[error("missing {kind} with checksum {checksum}")]
    MissingResource {
        kind: ResourceKind,
        checksum: String,
    },

    /// A field kind reached a resolver that cannot decode it.
    #[error("no resolver for field kind {0}")]
    UnsupportedField(&'static str),

    /// The object is already being decoded further up this thread's stack,
    /// or by a thread that is itself waiting on this one.
    #[error("asset {0} is already being loaded")]
    InProgress(String),

    /// Host decoder failure.
    #[error("decoder error: {0}")]
    Decoder(String),
}

impl From<CodecError> for LoadError {
    fn from(source: CodecError) -> Self {
        LoadError::Payload {
            asset: String::from("<inline>"),
            source,
        }
    }
}

/// Top-level error for library consumers.
#[derive(Debug, Error)]
pub enum Error {
    /// Loading failure.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Report or settings I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::MissingResource {
            kind: ResourceKind::Mesh,
            checksum: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "missing mesh with checksum abc");

        let err = LoadError::MissingObject("MyPack.Lamp_Data".to_string());
        assert!(err.to_string().contains("MyPack.Lamp_Data"));
    }

    #[test]
    fn test_load_error_from_codec() {
        let err: LoadError = CodecError::InvalidBool(3).into();
        assert!(matches!(err, LoadError::Payload { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
