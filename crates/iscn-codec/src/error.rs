use thiserror::Error;

/// Errors from canonical encoding and decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("integer {0} does not fit a CBOR integer")]
    IntegerOutOfRange(i128),

    #[error("map key must be text, found {0}")]
    NonTextKey(String),

    #[error("unsupported CBOR tag {0}")]
    UnsupportedTag(u64),

    #[error("malformed link: {0}")]
    MalformedLink(String),

    #[error("{0} trailing bytes after the encoded item")]
    TrailingBytes(usize),

    #[error("duplicate map key {0:?}")]
    DuplicateKey(String),

    #[error("top-level value must be a map, found {0}")]
    NotAMap(&'static str),
}

pub type CodecResult<T> = Result<T, CodecError>;
