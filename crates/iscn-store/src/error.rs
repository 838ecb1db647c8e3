use iscn_schema::SchemaError;
use iscn_types::Cid;

/// Errors from block store and walker operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(Cid),

    /// Block bytes do not hash to the CID they are stored under.
    #[error("hash mismatch for block {0}")]
    HashMismatch(Cid),

    /// The CID names a hash algorithm this store cannot verify.
    #[error("unsupported hash algorithm in {0}")]
    UnsupportedHash(Cid),

    /// A file in a filesystem store does not carry a parseable CID name.
    #[error("corrupt block entry {name}: {reason}")]
    CorruptEntry { name: String, reason: String },

    /// A document could not be encoded, decoded or resolved.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The document was never encoded, so it has no block to store.
    #[error("document {0} has not been encoded")]
    NotEncoded(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
