//! The tokenizer context (C6): the thread-safe handle every public
//! operation is invoked through. A `parking_lot::Mutex` guards all mutable
//! state and is always locked for the full duration of an operation,
//! regardless of whether `thread_safe` mode is turned on — `thread_safe` is
//! reported through [`Statistics`] but never gates the lock itself, since
//! an uncontended `parking_lot::Mutex` is cheap and the locking abstraction
//! must always be real (see the Design Notes). `parking_lot` itself is
//! adopted from `examples/foundry-rs-foundry`, which leans on it throughout
//! for shared mutable state; the teacher crate has no locking idiom of its
//! own to imitate (`Rc`, not `Arc`, throughout).

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{ErrorKind, TokenizerError};
use crate::pattern::PatternFlags;
use crate::registry::PatternRegistry;
use crate::router;
use crate::scanner;
use crate::token::{Token, TokenFlags, TokenKind};
use crate::util::{Log, Position};

/// Ceiling past which `scan` reports `CapacityExhausted` instead of
/// growing the token buffer further.
pub const TOKEN_BUFFER_CEILING: usize = 1 << 20;

/// Default pattern-registry capacity, carried over from the original
/// `RIFT_TOKENIZER_MAX_PATTERNS` constant.
pub const DEFAULT_PATTERN_CAPACITY: usize = 256;

const MIN_TOKEN_CAPACITY: usize = 64;

/// Runtime mode flags set via [`TokenizerContext::set_mode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeConfig {
    /// When set, a position with no matching pattern halts the scan with
    /// `StrictScanFailed` instead of emitting an `unknown` token.
    pub strict: bool,
    /// When set, scan steps are logged at `Log::Success` / `Log::Result`
    /// severity via the `#[cfg(debug_assertions)]`-gated logger.
    pub debug: bool,
    /// Reported through [`Statistics`]; does not gate the mutex, which is
    /// always held for the duration of every public operation.
    pub thread_safe: bool,
    /// Flags applied globally regardless of per-pattern flags (currently
    /// advisory; carried for parity with the original `global_flags`
    /// field in `tokenizer_types.h`).
    pub global_flags: TokenFlags,
}

/// Runtime performance counters, mirroring `TokenizerStats` in
/// `examples/original_source/rift-0/include/rift-0/core/lexer/tokenizer_types.h`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Statistics {
    pub tokens_processed: usize,
    pub bytes_scanned: usize,
    pub error_count: u32,
    pub processing_time: Duration,
    pub dfa_states_created: usize,
    pub regex_patterns: usize,
    pub thread_safe: bool,
}

struct ContextState {
    registry: PatternRegistry,
    tokens: Vec<Token>,
    token_capacity: usize,
    mode: ModeConfig,
    quantum_mode_active: bool,
    line: usize,
    column: usize,
    error: Option<TokenizerError>,
    stats: Statistics,
}

/// The thread-safe handle for the whole tokenization core: pattern
/// registry, token buffer, position tracking, mode flags, sticky error
/// state and statistics all live behind one lock.
pub struct TokenizerContext {
    inner: Mutex<ContextState>,
}

impl TokenizerContext {
    /// Creates a context with the given initial token-buffer and
    /// pattern-registry capacities. Both must be non-zero.
    pub fn new(token_capacity: usize, pattern_capacity: usize) -> Result<Self, TokenizerError> {
        if token_capacity == 0 || pattern_capacity == 0 {
            return Err(TokenizerError::new(
                ErrorKind::InvalidInput,
                "token_capacity and pattern_capacity must be non-zero",
            ));
        }
        let rounded = token_capacity.next_power_of_two().max(MIN_TOKEN_CAPACITY);
        Ok(Self {
            inner: Mutex::new(ContextState {
                registry: PatternRegistry::new(pattern_capacity),
                tokens: Vec::with_capacity(rounded),
                token_capacity: rounded,
                mode: ModeConfig::default(),
                quantum_mode_active: false,
                line: 1,
                column: 1,
                error: None,
                stats: Statistics::default(),
            }),
        })
    }

    pub fn register_pattern(
        &self,
        name: &str,
        pattern: &str,
        flags: PatternFlags,
        kind: TokenKind,
        priority: i32,
    ) -> Result<(), TokenizerError> {
        let mut state = self.inner.lock();
        match state.registry.register(name, pattern, flags, kind, priority) {
            Ok(()) => {
                state.stats.regex_patterns = state.registry.count();
                state.stats.dfa_states_created = state
                    .registry
                    .iter()
                    .map(|entry| entry.compiled.dfa().state_count())
                    .sum();
                Ok(())
            }
            Err(err) => {
                state.error = Some(err.clone());
                state.stats.error_count += 1;
                Err(err)
            }
        }
    }

    pub fn unregister_pattern(&self, name: &str) -> Result<(), TokenizerError> {
        let mut state = self.inner.lock();
        match state.registry.unregister(name) {
            Ok(()) => {
                state.stats.regex_patterns = state.registry.count();
                state.stats.dfa_states_created = state
                    .registry
                    .iter()
                    .map(|entry| entry.compiled.dfa().state_count())
                    .sum();
                Ok(())
            }
            Err(err) => {
                state.error = Some(err.clone());
                state.stats.error_count += 1;
                Err(err)
            }
        }
    }

    pub fn clear_patterns(&self) {
        let mut state = self.inner.lock();
        state.registry.clear();
        state.stats.regex_patterns = 0;
        state.stats.dfa_states_created = 0;
    }

    pub fn set_mode(&self, mode: ModeConfig) {
        let mut state = self.inner.lock();
        state.mode = mode;
    }

    /// Scans `input` against the registered patterns. The buffer is only
    /// ever borrowed for the duration of this call; it is never retained on
    /// the context, which is what lets `TokenizerContext` itself carry no
    /// lifetime parameter.
    ///
    /// Error state here is an explicit exception to the general sticky-error
    /// rule: every call to `scan` overwrites the context's error field with
    /// its own outcome — `None` on success, even if a previous operation had
    /// left an error behind — rather than requiring `clear_error` first.
    pub fn scan(&self, input: &[u8]) -> Result<usize, TokenizerError> {
        let mut state = self.inner.lock();
        let started = Instant::now();

        let log = if state.mode.debug {
            Log::Success("scan")
        } else {
            Log::None
        };

        let outcome = scanner::scan(
            &state.registry,
            input,
            state.mode.strict,
            state.quantum_mode_active,
            TOKEN_BUFFER_CEILING,
            log,
        );

        state.tokens = outcome.tokens;
        while state.token_capacity < state.tokens.len() && state.token_capacity < TOKEN_BUFFER_CEILING {
            state.token_capacity = (state.token_capacity * 2).min(TOKEN_BUFFER_CEILING);
        }

        // Every token the scanner hands back must validate against the
        // buffer it was scanned from; a violation here is a scanner bug,
        // not a caller error, so it is checked only in debug builds.
        #[cfg(debug_assertions)]
        for token in &state.tokens {
            debug_assert!(
                token.validate(input.len()).is_ok(),
                "scanner produced an out-of-bounds token: {:?}",
                token
            );
        }

        state.quantum_mode_active = outcome.quantum_mode_active;
        state.line = outcome.line;
        state.column = outcome.column;
        state.stats.tokens_processed += state.tokens.len();
        state.stats.bytes_scanned += input.len();
        state.stats.processing_time += started.elapsed();

        state.error = outcome.stopped_with_error.clone();
        if let Some(err) = outcome.stopped_with_error {
            state.stats.error_count += 1;
            return Err(err);
        }
        Ok(state.tokens.len())
    }

    /// Clears the token buffer and resets position tracking and the sticky
    /// quantum-mode toggle, but keeps every registered pattern. This makes
    /// `reset` followed by `scan` on the same input idempotent with the
    /// very first scan of that input.
    pub fn reset(&self) {
        let mut state = self.inner.lock();
        state.tokens.clear();
        state.line = 1;
        state.column = 1;
        state.quantum_mode_active = false;
    }

    pub fn get_tokens(&self, max: usize) -> Vec<Token> {
        let state = self.inner.lock();
        state.tokens.iter().take(max).copied().collect()
    }

    pub fn get_token_at(&self, index: usize) -> Result<Token, TokenizerError> {
        let mut state = self.inner.lock();
        match state.tokens.get(index).copied() {
            Some(token) => Ok(token),
            None => {
                let err = TokenizerError::new(
                    ErrorKind::OutOfRange,
                    format!(
                        "token index {} out of range (count {})",
                        index,
                        state.tokens.len()
                    ),
                );
                state.error = Some(err.clone());
                state.stats.error_count += 1;
                Err(err)
            }
        }
    }

    pub fn get_error(&self) -> Option<(ErrorKind, String)> {
        let state = self.inner.lock();
        state
            .error
            .as_ref()
            .map(|err| (err.kind(), err.message().to_string()))
    }

    pub fn clear_error(&self) {
        let mut state = self.inner.lock();
        state.error = None;
    }

    /// Splits the current token buffer into `(classical, quantum)` via the
    /// pure router function (C7).
    pub fn route(&self) -> (Vec<Token>, Vec<Token>) {
        let state = self.inner.lock();
        router::route(&state.tokens)
    }

    pub fn statistics(&self) -> Statistics {
        let state = self.inner.lock();
        let mut stats = state.stats;
        stats.thread_safe = state.mode.thread_safe;
        stats
    }

    /// The line/column reached by the most recent scan.
    pub fn position(&self) -> Position {
        let state = self.inner.lock();
        Position {
            line: state.line,
            column: state.column,
        }
    }
}
