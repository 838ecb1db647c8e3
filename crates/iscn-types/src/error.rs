use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("truncated varint")]
    TruncatedVarint,

    #[error("varint overflows 64 bits")]
    VarintOverflow,

    #[error("varint is not minimally encoded")]
    NonMinimalVarint,

    #[error("unsupported CID version {0}")]
    UnsupportedCidVersion(u64),

    #[error("unsupported multibase prefix {0:?}")]
    UnsupportedMultibase(Option<char>),

    #[error("{0} trailing bytes after CID")]
    TrailingBytes(usize),

    #[error("unsupported hash algorithm 0x{0:x}")]
    UnsupportedHash(u64),
}
