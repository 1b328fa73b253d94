//! A DFA-based lexical tokenization core: a pattern compiler that turns a
//! restricted regex dialect into deterministic finite automata, a named
//! pattern registry, a longest-match scanner, a thread-safe tokenizer
//! context, and a dual-channel router that separates "classical" tokens
//! from "quantum" (stateful/annotation) tokens for downstream consumers.
//!
//! # Overview
//!
//! Every public operation is invoked through a [`TokenizerContext`]
//! handle: register named patterns, scan an input buffer, read back the
//! resulting tokens, and split them into their classical and quantum
//! channels.
//!
//! ```
//! use rift0_tokenizer::{PatternFlags, TokenKind, TokenizerContext};
//!
//! let ctx = TokenizerContext::new(64, 16).unwrap();
//! ctx.register_pattern("ident", "[a-zA-Z_]+", PatternFlags::default(), TokenKind::Identifier, 0)
//!     .unwrap();
//! ctx.register_pattern("digits", "[0-9]+", PatternFlags::default(), TokenKind::Number, 0)
//!     .unwrap();
//! ctx.register_pattern("plus", "\\+", PatternFlags::default(), TokenKind::Operator, 0)
//!     .unwrap();
//!
//! ctx.scan(b"abc+123").unwrap();
//! let tokens = ctx.get_tokens(16);
//! assert_eq!(tokens[0].kind(), TokenKind::Identifier);
//! assert_eq!(tokens[1].kind(), TokenKind::Operator);
//! assert_eq!(tokens[2].kind(), TokenKind::Number);
//! assert_eq!(tokens[3].kind(), TokenKind::Eof);
//! ```
//!
//! # Longest match, priority, and registration order
//!
//! At every position the scanner tries every registered pattern and keeps
//! the one that consumes the most bytes. Ties are broken first by the
//! pattern's `priority` (higher wins), then by which pattern was
//! registered first — this lets a keyword pattern with elevated priority
//! win over a same-length identifier pattern without requiring the two to
//! be expressed as a single combined regex.
//!
//! # Dual-channel routing
//!
//! A fixed set of token kinds (`quantum-marker`, `collapse-marker`,
//! `entangle-marker`) and the sticky `!quantum` / `!classic` toggle
//! lexemes mark spans of the token stream as belonging to the "quantum"
//! channel; [`TokenizerContext::route`] splits the most recent scan's
//! output into its classical and quantum halves without re-scanning.

mod context;
mod dfa;
mod error;
mod pattern;
mod registry;
mod router;
mod scanner;
mod token;
mod util;

pub use context::{ModeConfig, Statistics, TokenizerContext, DEFAULT_PATTERN_CAPACITY, TOKEN_BUFFER_CEILING};
pub use error::{ErrorKind, TokenizerError};
pub use pattern::PatternFlags;
pub use token::{Token, TokenFlags, TokenKind};
pub use util::Position;
