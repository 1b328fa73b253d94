//! The scanner (C5): true longest-match tokenization over every pattern in
//! the registry, with priority as the first tie-break and a pattern's
//! registration order in the registry as the final tie-break.
//!
//! This generalizes the teacher crate's sequential `find_map`-based
//! tokenize loop (`examples/creative-forest-lang-pt/src/tokenization.rs`),
//! which stops at the first matching lexeme rather than the longest one —
//! the specification requires true longest-match-with-tiebreak, so the
//! loop shape here (position tracking, eof handling) follows the teacher
//! while the match-selection rule does not.

use crate::error::{ErrorKind, TokenizerError};
use crate::registry::PatternRegistry;
use crate::token::{Token, TokenFlags, TokenKind};
use crate::util::{Code, Log};

/// The outcome of one call to [`scan`]: the tokens produced (always ending
/// in a single eof token unless a strict-mode failure cut the scan short),
/// the sticky quantum-mode toggle state after the scan, the final
/// line/column, and an error if strict mode halted early.
pub struct ScanOutcome {
    pub tokens: Vec<Token>,
    pub quantum_mode_active: bool,
    pub line: usize,
    pub column: usize,
    pub stopped_with_error: Option<TokenizerError>,
}

const QUANTUM_TOGGLE_ON: &[u8] = b"!quantum";
const QUANTUM_TOGGLE_OFF: &[u8] = b"!classic";

/// Scans `input` against every pattern in `registry`, starting with the
/// sticky quantum-mode toggle at `quantum_mode_active`. Stops at the token
/// buffer ceiling `max_tokens` (including the trailing eof token) even in
/// lenient mode, reporting the tokens produced so far.
pub fn scan(
    registry: &PatternRegistry,
    input: &[u8],
    strict: bool,
    mut quantum_mode_active: bool,
    max_tokens: usize,
    log: Log<&'static str>,
) -> ScanOutcome {
    let code = Code::new(input);
    let mut tokens: Vec<Token> = Vec::new();
    let mut pos = 0usize;
    let mut line = 1usize;
    let mut column = 1usize;
    let mut stopped_with_error = None;

    'scan: while pos < input.len() {
        if tokens.len() + 1 >= max_tokens {
            stopped_with_error = Some(TokenizerError::new(
                ErrorKind::CapacityExhausted,
                "token buffer ceiling reached during scan",
            ));
            break;
        }

        // (length, kind, priority, registration index, validated-compile-flag)
        let mut best: Option<(usize, TokenKind, i32, usize, bool)> = None;
        for (idx, entry) in registry.iter().enumerate() {
            if let Some((len, accept)) = entry.compiled.matches_at(input, pos) {
                let is_better = match best {
                    None => true,
                    Some((best_len, _, best_priority, best_idx, _)) => {
                        len > best_len
                            || (len == best_len && accept.priority > best_priority)
                            || (len == best_len
                                && accept.priority == best_priority
                                && idx < best_idx)
                    }
                };
                if is_better {
                    best = Some((len, accept.kind, accept.priority, idx, entry.flags.validated));
                }
            }
        }

        let (lexeme_len, kind, mut flags) = match best {
            Some((len, kind, _, _, validated)) => {
                let mut flags = TokenFlags::NONE;
                if validated {
                    flags.insert(TokenFlags::VERIFIED);
                }
                log.log_scan_result(pos, Some(Token::new(kind, pos, len, flags)), &code);
                (len, kind, flags)
            }
            None => {
                if strict {
                    log.log_scan_result(pos, None, &code);
                    // Per the scanning contract, strict mode emits the error
                    // token itself before halting; tokens emitted earlier in
                    // the scan are preserved for the caller to inspect.
                    tokens.push(Token::new(TokenKind::Error, pos, 1, TokenFlags::NONE));
                    stopped_with_error = Some(TokenizerError::new(
                        ErrorKind::StrictScanFailed,
                        format!("no pattern matched at byte offset {}", pos),
                    ));
                    break 'scan;
                }
                (1, TokenKind::Unknown, TokenFlags::NONE)
            }
        };

        let lexeme = &input[pos..pos + lexeme_len];

        // Sticky quantum-mode toggle: the literal lexemes `!quantum` /
        // `!classic` flip the mode for tokens emitted *after* this one; the
        // triggering token itself is tagged with the mode that was active
        // before the flip. `kind.is_quantum()` is a separate, unconditional
        // routing signal the router reads directly — it is not folded into
        // this flag, so a marker token's own flag reflects only the toggle
        // state at the moment it was scanned.
        if quantum_mode_active {
            flags.insert(TokenFlags::QUANTUM);
        } else {
            flags.insert(TokenFlags::CLASSICAL);
        }
        tokens.push(Token::new(kind, pos, lexeme_len, flags));

        if lexeme == QUANTUM_TOGGLE_ON {
            quantum_mode_active = true;
        } else if lexeme == QUANTUM_TOGGLE_OFF {
            quantum_mode_active = false;
        }

        for &b in lexeme {
            if b == b'\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        pos += lexeme_len;
    }

    if stopped_with_error.is_none() {
        tokens.push(Token::eof(pos));
    }

    ScanOutcome {
        tokens,
        quantum_mode_active,
        line,
        column,
        stopped_with_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternFlags;

    fn registry_with(patterns: &[(&str, &str, TokenKind, i32)]) -> PatternRegistry {
        let mut registry = PatternRegistry::new(64);
        for (name, pattern, kind, priority) in patterns {
            registry
                .register(name, pattern, PatternFlags::default(), *kind, *priority)
                .unwrap();
        }
        registry
    }

    #[test]
    fn empty_input_yields_only_eof() {
        let registry = registry_with(&[]);
        let outcome = scan(&registry, b"", false, false, 1024, Log::None);
        assert_eq!(outcome.tokens.len(), 1);
        assert_eq!(outcome.tokens[0].kind(), TokenKind::Eof);
    }

    #[test]
    fn longest_match_wins_over_shorter_alternatives() {
        let registry = registry_with(&[
            ("short", "if", TokenKind::Identifier, 0),
            ("long", "[a-z]+", TokenKind::Identifier, 0),
        ]);
        let outcome = scan(&registry, b"ifx", false, false, 1024, Log::None);
        assert_eq!(outcome.tokens[0].length(), 3);
    }

    #[test]
    fn priority_breaks_ties_at_equal_length() {
        let registry = registry_with(&[
            ("ident", "if", TokenKind::Identifier, 0),
            ("kw", "if", TokenKind::Keyword, 10),
        ]);
        let outcome = scan(&registry, b"if", false, false, 1024, Log::None);
        assert_eq!(outcome.tokens[0].kind(), TokenKind::Keyword);
    }

    #[test]
    fn registration_order_breaks_remaining_ties() {
        let registry = registry_with(&[
            ("first", "if", TokenKind::Identifier, 0),
            ("second", "if", TokenKind::Keyword, 0),
        ]);
        let outcome = scan(&registry, b"if", false, false, 1024, Log::None);
        assert_eq!(outcome.tokens[0].kind(), TokenKind::Identifier);
    }

    #[test]
    fn lenient_mode_emits_unknown_and_advances_one_byte() {
        let registry = registry_with(&[("digits", "[0-9]+", TokenKind::Number, 0)]);
        let outcome = scan(&registry, b"1@2", false, false, 1024, Log::None);
        assert_eq!(outcome.tokens[0].kind(), TokenKind::Number);
        assert_eq!(outcome.tokens[1].kind(), TokenKind::Unknown);
        assert_eq!(outcome.tokens[1].length(), 1);
        assert_eq!(outcome.tokens[2].kind(), TokenKind::Number);
    }

    #[test]
    fn strict_mode_halts_on_no_match() {
        let registry = registry_with(&[("digits", "[0-9]+", TokenKind::Number, 0)]);
        let outcome = scan(&registry, b"1@2", true, false, 1024, Log::None);
        assert!(outcome.stopped_with_error.is_some());
        assert_eq!(
            outcome.stopped_with_error.unwrap().kind(),
            ErrorKind::StrictScanFailed
        );
        // tokens emitted before the failure are preserved, and the
        // failing position itself is reported as an error token.
        assert_eq!(outcome.tokens[0].kind(), TokenKind::Number);
        assert_eq!(outcome.tokens[1].kind(), TokenKind::Error);
        assert_eq!(outcome.tokens[1].offset(), 1);
        assert_eq!(outcome.tokens[1].length(), 1);
    }

    #[test]
    fn line_and_column_track_newlines() {
        let registry = registry_with(&[
            ("word", "[a-z]+", TokenKind::Identifier, 0),
            ("nl", "\n", TokenKind::Whitespace, 0),
        ]);
        let outcome = scan(&registry, b"x\ny", false, false, 1024, Log::None);
        assert_eq!(outcome.line, 2);
        assert_eq!(outcome.column, 2);
    }

    #[test]
    fn quantum_toggle_applies_after_the_triggering_token() {
        let registry = registry_with(&[
            ("qon", "!quantum", TokenKind::QuantumMarker, 0),
            ("word", "[a-z]+", TokenKind::Identifier, 0),
        ]);
        let outcome = scan(&registry, b"!quantumx", false, false, 1024, Log::None);
        assert_eq!(outcome.tokens[0].kind(), TokenKind::QuantumMarker);
        assert!(!outcome.tokens[0].flags().contains(TokenFlags::QUANTUM));
        assert!(outcome.tokens[1].flags().contains(TokenFlags::QUANTUM));
        assert!(outcome.quantum_mode_active);
    }
}
