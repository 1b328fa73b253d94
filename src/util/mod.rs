//! Position tracking and leveled debug logging, carried over from the
//! teacher crate's own `util` module.

mod code;
mod logger;
mod position;
use once_cell::unsync::OnceCell;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A borrowed view of the bytes under scan, with line-break offsets
/// computed lazily and cached for O(log n) position lookups.
pub struct Code<'c> {
    pub value: &'c [u8],
    line_breaks: OnceCell<Vec<usize>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A leveled debug-logging marker used by the scanner and pattern compiler.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}
