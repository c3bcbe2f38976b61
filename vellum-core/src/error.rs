//! Error types for codec and document-image operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of buffer")]
    UnexpectedEof,

    #[error("varint longer than 10 bytes")]
    VarintTooLong,

    #[error("decoded integer out of range")]
    OutOfRange,

    #[error("invalid length prefix: {0}")]
    InvalidLength(u8),

    #[error("invalid value tag: {0:#04x}")]
    InvalidTag(u8),

    #[error("document root is not a dictionary")]
    RootNotDict,

    #[error("trailing bytes after document root")]
    TrailingData,

    #[error("ineligible shared key")]
    IneligibleKey,
}

pub type Result<T> = std::result::Result<T, CodecError>;
