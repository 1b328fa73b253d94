//! Error taxonomy for the tokenization core.
//!
//! Mirrors the hand-written `Display`-impl style of the teacher crate's
//! `ImplementationError`/`ParseError` (`examples/creative-forest-lang-pt/src/error.rs`):
//! a small closed enum plus a single error struct, no derive-macro error crate.

use std::fmt::{Display, Formatter};

/// The ten error kinds a tokenizer operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied input is unusable as-is (e.g. a null capacity).
    InvalidInput,
    /// A pattern string could not be compiled: unsupported construct,
    /// unterminated class, stray metacharacter, or an empty-matching
    /// pattern.
    InvalidPattern,
    /// A bounded resource (pattern registry, DFA state table, token
    /// buffer) has reached its ceiling.
    CapacityExhausted,
    /// The host allocator refused a request.
    AllocationFailed,
    /// `register_pattern` was called with a name already present in the
    /// registry.
    DuplicateName,
    /// `unregister_pattern` or a lookup referenced a name or index that
    /// does not exist.
    NotFound,
    /// An index argument fell outside the valid range.
    OutOfRange,
    /// `scan` was run in strict mode and no pattern matched at some
    /// position.
    StrictScanFailed,
    /// Two registered patterns would require a state to carry two
    /// different transitions on the same byte.
    DeterminismViolation,
    /// Any invariant violation that does not fit the kinds above.
    Internal,
}

/// The single error type returned by every fallible operation on a
/// [`crate::TokenizerContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerError {
    kind: ErrorKind,
    message: String,
}

impl TokenizerError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TokenizerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TokenizerError {}
