//! Binary package payload codec.
//!
//! Asset payloads in the content pool use a little-endian binary layout:
//!
//! | Type     | Encoding                                         |
//! |----------|--------------------------------------------------|
//! | `i32`    | 4 bytes, little-endian                           |
//! | `u32`    | 4 bytes, little-endian                           |
//! | `f32`    | 4 bytes, IEEE 754, little-endian                 |
//! | `bool`   | 1 byte, `0` or `1`                               |
//! | `string` | 7-bit variable-length byte count, then UTF-8     |
//!
//! [`PackageReader`] decodes these primitives from a [`bytes::Bytes`] buffer;
//! [`PackageWriter`] produces them. Higher-level layouts (metadata records,
//! materials, prefabs) are built from these primitives by the modules that
//! own them.

mod reader;
mod writer;

pub use reader::PackageReader;
pub use writer::PackageWriter;

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while decoding a payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The payload ended before a value could be read.
    #[error("unexpected end of payload: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A string was not valid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte: {0}")]
    InvalidBool(u8),

    /// A string length prefix did not fit in 32 bits.
    #[error("malformed string length prefix")]
    BadLength,

    /// An enumerated tag had no known meaning.
    #[error("unknown {what} tag: {tag}")]
    UnknownTag { what: &'static str, tag: i32 },

    /// A count field was negative.
    #[error("negative {what} count: {count}")]
    NegativeCount { what: &'static str, count: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::UnexpectedEof {
            needed: 4,
            remaining: 1,
        };
        assert_eq!(
            err.to_string(),
            "unexpected end of payload: needed 4 bytes, 1 remaining"
        );

        let err = CodecError::UnknownTag {
            what: "property",
            tag: 9,
        };
        assert_eq!(err.to_string(), "unknown property tag: 9");
    }
}
