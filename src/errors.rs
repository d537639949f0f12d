use thiserror::Error;

/// The result type for the `dfalex` crate.
pub type Result<T> = std::result::Result<T, DfalexError>;

/// The error type for the `dfalex` crate.
#[derive(Error, Debug)]
pub struct DfalexError {
    /// The source of the error.
    pub source: Box<DfalexErrorKind>,
}

impl DfalexError {
    /// Create a new `DfalexError`.
    pub fn new(kind: DfalexErrorKind) -> Self {
        DfalexError {
            source: Box::new(kind),
        }
    }
}

impl std::fmt::Display for DfalexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum DfalexErrorKind {
    /// Two or more accept values collide at a DFA state and the ambiguity resolver is
    /// absent or refuses to pick one.
    #[error("ambiguous match: {0:?} collide and were not resolved")]
    AmbiguousMatch(String),

    /// `first > last` in a range literal.
    #[error("invalid character range: first ({0}) > last ({1})")]
    InvalidRange(u16, u16),

    /// A build-cache operation failed. Never fatal: the adapter logs this as a warning and
    /// falls back to an uncached build.
    #[error("build cache I/O error: {0}")]
    CacheIOError(String),

    /// A persisted DFA could not be decoded. Fatal to the load call that produced it.
    #[error("failed to deserialize a persisted DFA: {0}")]
    SerializationError(String),
}

impl From<DfalexErrorKind> for DfalexError {
    fn from(kind: DfalexErrorKind) -> Self {
        DfalexError::new(kind)
    }
}
