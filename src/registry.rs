//! The pattern registry (C4): an ordered collection of named, compiled
//! patterns. Registration order is significant — it is the final tie-break
//! the scanner (C5) falls back on when two patterns match the same length
//! at the same priority.

use crate::error::{ErrorKind, TokenizerError};
use crate::pattern::{compile, CompiledPattern, PatternFlags};
use crate::token::TokenKind;

/// Default ceiling on the number of simultaneously registered patterns,
/// carried over from the original `RIFT_TOKENIZER_MAX_PATTERNS` constant.
pub const MAX_PATTERNS_DEFAULT: usize = 256;

pub struct PatternEntry {
    pub name: String,
    pub pattern_text: String,
    pub flags: PatternFlags,
    pub kind: TokenKind,
    pub priority: i32,
    pub compiled: CompiledPattern,
}

/// An ordered set of compiled patterns, keyed by unique name.
pub struct PatternRegistry {
    entries: Vec<PatternEntry>,
    capacity: usize,
}

impl PatternRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    pub fn register(
        &mut self,
        name: &str,
        pattern: &str,
        flags: PatternFlags,
        kind: TokenKind,
        priority: i32,
    ) -> Result<(), TokenizerError> {
        if self.entries.iter().any(|e| e.name == name) {
            return Err(TokenizerError::new(
                ErrorKind::DuplicateName,
                format!("pattern '{}' is already registered", name),
            ));
        }
        if self.entries.len() >= self.capacity {
            return Err(TokenizerError::new(
                ErrorKind::CapacityExhausted,
                format!("pattern registry capacity {} reached", self.capacity),
            ));
        }

        // Compile before inserting: a failed compile must leave `count()`
        // unchanged (registry-isolation testable property).
        let compiled = compile(pattern, flags, kind, priority)?;

        self.entries.push(PatternEntry {
            name: name.to_string(),
            pattern_text: pattern.to_string(),
            flags,
            kind,
            priority,
            compiled,
        });
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<(), TokenizerError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| {
                TokenizerError::new(
                    ErrorKind::NotFound,
                    format!("pattern '{}' is not registered", name),
                )
            })?;
        self.entries.remove(idx);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> PatternFlags {
        PatternFlags::default()
    }

    #[test]
    fn register_and_count() {
        let mut registry = PatternRegistry::new(MAX_PATTERNS_DEFAULT);
        registry
            .register("ident", "[a-z]+", flags(), TokenKind::Identifier, 0)
            .unwrap();
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = PatternRegistry::new(MAX_PATTERNS_DEFAULT);
        registry
            .register("ident", "[a-z]+", flags(), TokenKind::Identifier, 0)
            .unwrap();
        let err = registry
            .register("ident", "[0-9]+", flags(), TokenKind::Number, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn invalid_pattern_leaves_registry_unchanged() {
        let mut registry = PatternRegistry::new(MAX_PATTERNS_DEFAULT);
        let err = registry
            .register("bad", "a(b)", flags(), TokenKind::Identifier, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPattern);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut registry = PatternRegistry::new(1);
        registry
            .register("a", "a", flags(), TokenKind::Identifier, 0)
            .unwrap();
        let err = registry
            .register("b", "b", flags(), TokenKind::Identifier, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExhausted);
    }

    #[test]
    fn unregister_removes_by_name() {
        let mut registry = PatternRegistry::new(MAX_PATTERNS_DEFAULT);
        registry
            .register("ident", "[a-z]+", flags(), TokenKind::Identifier, 0)
            .unwrap();
        registry.unregister("ident").unwrap();
        assert_eq!(registry.count(), 0);
        let err = registry.unregister("ident").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
