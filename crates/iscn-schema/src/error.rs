use iscn_codec::CodecError;
use iscn_types::Cid;
use thiserror::Error;

/// Errors from schema construction, encoding, decoding, and resolution.
///
/// Propagation is fail-fast: the first failing property aborts the whole
/// call. Array element failures are wrapped in [`SchemaError::Element`] so
/// the originating index survives propagation.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("property {key:?} is required")]
    MissingRequiredProperty { key: String },

    #[error("{key}: {expected} is expected but {actual} is found")]
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("{key}: {reason}")]
    ConstraintViolation { key: String, reason: String },

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("codec 0x{0:x} is not registered")]
    UnknownCodec(u64),

    #[error("<{name} (v{version})> is not implemented")]
    UnimplementedVersion { name: String, version: u64 },

    /// The decoded content does not hash to its claimed address.
    #[error("CID {actual} does not match expected {expected}")]
    CidMismatch { expected: Cid, actual: Cid },

    #[error("invalid document: missing context")]
    MissingContext,

    #[error("no such link: {0}")]
    NoSuchLink(String),

    #[error("index {index} does not exist (length {len})")]
    IndexOutOfRange { index: u64, len: usize },

    #[error("resolved item is not a link")]
    NotALink,

    #[error("property {0:?} is not found")]
    PropertyNotFound(String),

    #[error("(index {index}) {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("malformed wire data: {0}")]
    MalformedWire(String),

    #[error("unsupported hash algorithm 0x{0:x}")]
    UnsupportedHash(u64),

    #[error("duplicate property {0:?}")]
    DuplicateProperty(String),

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl SchemaError {
    pub(crate) fn type_mismatch(
        key: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            key: key.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn constraint(key: &str, reason: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Annotate this error with the array index it originated from.
    pub fn at_index(self, index: usize) -> Self {
        Self::Element {
            index,
            source: Box::new(self),
        }
    }

    /// The error with every array-index annotation stripped.
    pub fn root_cause(&self) -> &SchemaError {
        match self {
            Self::Element { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Array indices from the outermost annotation inwards.
    pub fn element_path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Element { index, source } = current {
            path.push(*index);
            current = source;
        }
        path
    }

    /// Whether this error means content does not match its address, as
    /// opposed to a schema or validation failure.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self.root_cause(), Self::CidMismatch { .. })
    }
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
