//! The token record (C1): a fixed, non-generic kind enumeration, a
//! hand-rolled flags byte, and an immutable value-object token type.
//!
//! Unlike the teacher crate's `TToken: TokenImpl` type parameter, the kind
//! set here is closed by the specification, so `TokenKind` is a plain
//! `#[repr(u8)]` enum rather than a generic trait bound.

use crate::error::{ErrorKind, TokenizerError};

/// The sixteen lexical categories a scanned token can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Operator,
    Delimiter,
    Keyword,
    Whitespace,
    Comment,
    RPattern,
    NullKeyword,
    NilKeyword,
    QuantumMarker,
    CollapseMarker,
    EntangleMarker,
    GovernanceTag,
    Error,
    Eof,
    Unknown,
}

impl TokenKind {
    /// True for the kinds that are unconditionally routed to the quantum
    /// channel regardless of the scanner's sticky mode toggle.
    pub fn is_quantum(&self) -> bool {
        matches!(
            self,
            TokenKind::QuantumMarker | TokenKind::CollapseMarker | TokenKind::EntangleMarker
        )
    }
}

/// A hand-rolled bitset over a single byte. Kept as a small named-constant
/// type rather than pulling in `bitflags`, matching the teacher's
/// preference for plain types over helper-macro crates at this size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenFlags(u8);

impl TokenFlags {
    pub const NONE: TokenFlags = TokenFlags(0x00);
    pub const CLASSICAL: TokenFlags = TokenFlags(0x01);
    pub const QUANTUM: TokenFlags = TokenFlags(0x02);
    pub const TRUSTED: TokenFlags = TokenFlags(0x04);
    pub const VERIFIED: TokenFlags = TokenFlags(0x08);
    pub const GOVERNANCE: TokenFlags = TokenFlags(0x10);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bits(bits: u8) -> Self {
        TokenFlags(bits)
    }

    pub fn contains(self, bit: TokenFlags) -> bool {
        self.0 & bit.0 == bit.0
    }

    pub fn insert(&mut self, bit: TokenFlags) {
        self.0 |= bit.0;
    }

    pub fn remove(&mut self, bit: TokenFlags) {
        self.0 &= !bit.0;
    }

    pub fn union(self, other: TokenFlags) -> TokenFlags {
        TokenFlags(self.0 | other.0)
    }
}

impl std::ops::BitOr for TokenFlags {
    type Output = TokenFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// A scanned token: immutable once emitted by the scanner. `offset` and
/// `length` are byte offsets into the buffer that was passed to `scan`;
/// the buffer itself is never retained on the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    kind: TokenKind,
    offset: usize,
    length: usize,
    flags: TokenFlags,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize, length: usize, flags: TokenFlags) -> Self {
        Self {
            kind,
            offset,
            length,
            flags,
        }
    }

    /// The zero-length sentinel emitted once at the end of every scan.
    pub fn eof(offset: usize) -> Self {
        Self::new(TokenKind::Eof, offset, 0, TokenFlags::NONE)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn flags(&self) -> TokenFlags {
        self.flags
    }

    /// Returns a copy of this token with `flags` replaced. `Token` is `Copy`,
    /// so this never mutates a token already held in a buffer.
    pub fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Rejects a token whose bounds fall outside the buffer it claims to
    /// describe, or whose length is zero while not being the eof token.
    pub fn validate(&self, input_len: usize) -> Result<(), TokenizerError> {
        if self.end() > input_len {
            return Err(TokenizerError::new(
                ErrorKind::Internal,
                format!(
                    "token [{}, {}) exceeds input length {}",
                    self.offset,
                    self.end(),
                    input_len
                ),
            ));
        }
        if self.length == 0 && self.kind != TokenKind::Eof {
            return Err(TokenizerError::new(
                ErrorKind::Internal,
                "only the eof token may have zero length",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Token")
            .field(&self.kind)
            .field(&self.offset)
            .field(&self.length)
            .finish()
    }
}
