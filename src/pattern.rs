//! The pattern compiler (C3): parses the restricted regex dialect named in
//! the specification into a small AST, builds a Thompson-construction NFA
//! with epsilon transitions, then performs subset construction into the
//! [`crate::dfa::DfaGraph`] (C2).
//!
//! Subset construction is an implementation detail the specification leaves
//! open; it was chosen because it produces a single owned graph per pattern
//! rather than needing a separate NFA type kept alive alongside its DFA.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::dfa::{Accept, DfaGraph, StateId, DFA_MAX_STATES};
use crate::error::{ErrorKind, TokenizerError};
use crate::token::TokenKind;

/// Compile-time flags carried on a registered pattern. These mirror the
/// compiled-flag byte packed onto `TokenTriplet.value` in the original
/// `rift-0` sources (global/multiline/ignorecase/topdown/bottomup/composed/
/// validated) — see `examples/original_source/rift-0/include/rift-0/core/lexer/tokenizer_types.h`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
    pub case_insensitive: bool,
    pub multiline: bool,
    pub global: bool,
    pub top_down: bool,
    pub bottom_up: bool,
    pub composed: bool,
    pub validated: bool,
}

/// A pattern compiled down to a DFA, plus the anchor requirements the DFA
/// itself cannot express (anchors are zero-width position assertions, not
/// consumed bytes).
pub struct CompiledPattern {
    dfa: DfaGraph,
    start: StateId,
    anchored_start: bool,
    anchored_end: bool,
    multiline: bool,
}

impl CompiledPattern {
    /// Finds the longest match for this pattern starting exactly at
    /// `pos` in `code`, honoring `^`/`$` anchors if present. Returns the
    /// matched length together with the token kind/priority it was
    /// compiled for.
    pub fn matches_at(&self, code: &[u8], pos: usize) -> Option<(usize, Accept)> {
        if self.anchored_start {
            let at_line_start =
                pos == 0 || (self.multiline && code.get(pos - 1) == Some(&b'\n'));
            if !at_line_start {
                return None;
            }
        }

        let input = &code[pos..];
        let prefixes = self.dfa.accepting_prefixes(self.start, input);
        prefixes
            .into_iter()
            .filter(|(len, _)| {
                *len > 0
                    && (!self.anchored_end || {
                        let end = pos + len;
                        end == code.len() || (self.multiline && code.get(end) == Some(&b'\n'))
                    })
            })
            .max_by_key(|(len, _)| *len)
    }

    pub fn dfa(&self) -> &DfaGraph {
        &self.dfa
    }
}

/// Compiles `pattern` under `flags` into a DFA that accepts as `kind` with
/// tie-break `priority`. Fails with `InvalidPattern` for an unsupported
/// construct, an unterminated character class, a dangling escape, or a
/// pattern that would match the empty string.
pub fn compile(
    pattern: &str,
    flags: PatternFlags,
    kind: TokenKind,
    priority: i32,
) -> Result<CompiledPattern, TokenizerError> {
    let mut parser = Parser::new(pattern.as_bytes());
    let (ast, anchored_start, anchored_end) = parser.parse()?;

    let mut builder = NfaBuilder::new();
    let fragment = build_fragment(&ast, &mut builder, flags.multiline, flags.case_insensitive);

    let dfa = subset_construct(
        &builder,
        fragment.start,
        fragment.end,
        kind,
        priority,
        DFA_MAX_STATES,
    )?;

    // A nullable pattern (e.g. `[a-z]*`) is allowed to compile — it simply
    // never contributes a zero-length match, since `matches_at` filters
    // those out. Only the runtime match length is constrained to be >= 1.
    let start = dfa.start();
    Ok(CompiledPattern {
        dfa,
        start,
        anchored_start,
        anchored_end,
        multiline: flags.multiline,
    })
}

fn invalid_pattern(message: impl Into<String>) -> TokenizerError {
    TokenizerError::new(ErrorKind::InvalidPattern, message)
}

fn unsupported(message: impl Into<String>) -> TokenizerError {
    TokenizerError::new(ErrorKind::InvalidPattern, message)
}

// ---------------------------------------------------------------------
// Regex AST
// ---------------------------------------------------------------------

enum Ast {
    Literal(u8),
    Class { negate: bool, ranges: Vec<(u8, u8)> },
    Any,
    Concat(Vec<Ast>),
    Star(Box<Ast>),
    Plus(Box<Ast>),
    Optional(Box<Ast>),
}

fn is_reserved(c: u8) -> bool {
    matches!(
        c,
        b'^' | b'$' | b'*' | b'+' | b'?' | b'(' | b')' | b'|' | b'{' | b'}' | b']'
    )
}

fn unescape(c: u8) -> u8 {
    match c {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'0' => 0,
        other => other,
    }
}

struct Parser<'p> {
    bytes: &'p [u8],
    pos: usize,
}

impl<'p> Parser<'p> {
    fn new(bytes: &'p [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Parses the whole pattern, returning the body AST plus whether a
    /// leading `^` / trailing `$` anchor was present.
    fn parse(&mut self) -> Result<(Ast, bool, bool), TokenizerError> {
        if self.bytes.is_empty() {
            return Err(invalid_pattern("pattern must not be empty"));
        }

        let anchored_start = if self.peek() == Some(b'^') {
            self.bump();
            true
        } else {
            false
        };

        let mut items = Vec::new();
        let mut anchored_end = false;

        while let Some(c) = self.peek() {
            if c == b'$' && self.pos == self.bytes.len() - 1 {
                self.bump();
                anchored_end = true;
                break;
            }
            let atom = self.parse_atom()?;
            let atom = self.parse_quantifier(atom)?;
            items.push(atom);
        }

        if self.pos != self.bytes.len() {
            return Err(unsupported("unexpected trailing characters after '$'"));
        }
        if items.is_empty() {
            return Err(invalid_pattern(
                "pattern must contain at least one matched atom",
            ));
        }

        let ast = if items.len() == 1 {
            items.pop().unwrap()
        } else {
            Ast::Concat(items)
        };
        Ok((ast, anchored_start, anchored_end))
    }

    fn parse_atom(&mut self) -> Result<Ast, TokenizerError> {
        match self.bump() {
            Some(b'.') => Ok(Ast::Any),
            Some(b'[') => self.parse_class(),
            Some(b'\\') => {
                let c = self
                    .bump()
                    .ok_or_else(|| invalid_pattern("dangling escape at end of pattern"))?;
                Ok(Ast::Literal(unescape(c)))
            }
            Some(b'^') => Err(unsupported("'^' is only valid at the start of a pattern")),
            Some(c) if is_reserved(c) => Err(unsupported(format!(
                "unsupported construct '{}'",
                c as char
            ))),
            Some(c) => Ok(Ast::Literal(c)),
            None => Err(invalid_pattern("unexpected end of pattern")),
        }
    }

    fn parse_quantifier(&mut self, atom: Ast) -> Result<Ast, TokenizerError> {
        match self.peek() {
            Some(b'*') => {
                self.bump();
                Ok(Ast::Star(Box::new(atom)))
            }
            Some(b'+') => {
                self.bump();
                Ok(Ast::Plus(Box::new(atom)))
            }
            Some(b'?') => {
                self.bump();
                Ok(Ast::Optional(Box::new(atom)))
            }
            _ => Ok(atom),
        }
    }

    fn parse_class(&mut self) -> Result<Ast, TokenizerError> {
        let negate = if self.peek() == Some(b'^') {
            self.bump();
            true
        } else {
            false
        };

        let mut ranges = Vec::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(invalid_pattern("unterminated character class")),
                Some(b']') if !first => {
                    self.bump();
                    break;
                }
                _ => {
                    first = false;
                    let lo = self.parse_class_byte()?;
                    let is_range = self.peek() == Some(b'-')
                        && self.bytes.get(self.pos + 1).is_some()
                        && self.bytes.get(self.pos + 1) != Some(&b']');
                    if is_range {
                        self.bump();
                        let hi = self.parse_class_byte()?;
                        if hi < lo {
                            return Err(invalid_pattern("character class range is reversed"));
                        }
                        ranges.push((lo, hi));
                    } else {
                        ranges.push((lo, lo));
                    }
                }
            }
        }
        Ok(Ast::Class { negate, ranges })
    }

    fn parse_class_byte(&mut self) -> Result<u8, TokenizerError> {
        match self.bump() {
            Some(b'\\') => {
                let c = self
                    .bump()
                    .ok_or_else(|| invalid_pattern("dangling escape in character class"))?;
                Ok(unescape(c))
            }
            Some(c) => Ok(c),
            None => Err(invalid_pattern("unterminated character class")),
        }
    }
}

// ---------------------------------------------------------------------
// Thompson NFA construction
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
struct ByteSet([bool; 256]);

impl ByteSet {
    fn empty() -> Self {
        ByteSet([false; 256])
    }

    fn full() -> Self {
        ByteSet([true; 256])
    }

    fn single(b: u8) -> Self {
        let mut set = Self::empty();
        set.0[b as usize] = true;
        set
    }

    fn range(lo: u8, hi: u8) -> Self {
        let mut set = Self::empty();
        for b in lo..=hi {
            set.0[b as usize] = true;
        }
        set
    }

    fn any_except_lf() -> Self {
        let mut set = Self::full();
        set.0[b'\n' as usize] = false;
        set
    }

    fn union(&mut self, other: &ByteSet) {
        for i in 0..256 {
            self.0[i] |= other.0[i];
        }
    }

    fn negate(&self) -> Self {
        let mut set = *self;
        for i in 0..256 {
            set.0[i] = !set.0[i];
        }
        set
    }

    fn case_insensitive(&self) -> Self {
        let mut set = *self;
        for b in b'a'..=b'z' {
            if self.0[b as usize] {
                set.0[(b - 32) as usize] = true;
            }
        }
        for b in b'A'..=b'Z' {
            if self.0[b as usize] {
                set.0[(b + 32) as usize] = true;
            }
        }
        set
    }
}

struct NfaState {
    eps: Vec<usize>,
    on_byte: Vec<(ByteSet, usize)>,
}

struct NfaBuilder {
    states: Vec<NfaState>,
}

struct Fragment {
    start: usize,
    end: usize,
}

impl NfaBuilder {
    fn new() -> Self {
        Self { states: Vec::new() }
    }

    fn new_state(&mut self) -> usize {
        self.states.push(NfaState {
            eps: Vec::new(),
            on_byte: Vec::new(),
        });
        self.states.len() - 1
    }

    fn add_eps(&mut self, from: usize, to: usize) {
        self.states[from].eps.push(to);
    }

    fn add_byte(&mut self, from: usize, set: ByteSet, to: usize) {
        self.states[from].on_byte.push((set, to));
    }
}

fn build_fragment(ast: &Ast, b: &mut NfaBuilder, multiline: bool, ci: bool) -> Fragment {
    match ast {
        Ast::Literal(byte) => {
            let s = b.new_state();
            let e = b.new_state();
            let set = if ci {
                ByteSet::single(*byte).case_insensitive()
            } else {
                ByteSet::single(*byte)
            };
            b.add_byte(s, set, e);
            Fragment { start: s, end: e }
        }
        Ast::Any => {
            let s = b.new_state();
            let e = b.new_state();
            let set = if multiline {
                ByteSet::full()
            } else {
                ByteSet::any_except_lf()
            };
            b.add_byte(s, set, e);
            Fragment { start: s, end: e }
        }
        Ast::Class { negate, ranges } => {
            let s = b.new_state();
            let e = b.new_state();
            let mut set = ByteSet::empty();
            for (lo, hi) in ranges {
                let mut r = ByteSet::range(*lo, *hi);
                if ci {
                    r = r.case_insensitive();
                }
                set.union(&r);
            }
            if *negate {
                set = set.negate();
            }
            b.add_byte(s, set, e);
            Fragment { start: s, end: e }
        }
        Ast::Concat(items) => {
            let mut iter = items.iter();
            let first = iter.next().expect("parser never emits an empty concat");
            let mut frag = build_fragment(first, b, multiline, ci);
            for item in iter {
                let next = build_fragment(item, b, multiline, ci);
                b.add_eps(frag.end, next.start);
                frag.end = next.end;
            }
            frag
        }
        Ast::Star(inner) => {
            let s = b.new_state();
            let e = b.new_state();
            let f = build_fragment(inner, b, multiline, ci);
            b.add_eps(s, f.start);
            b.add_eps(s, e);
            b.add_eps(f.end, f.start);
            b.add_eps(f.end, e);
            Fragment { start: s, end: e }
        }
        Ast::Plus(inner) => {
            let f = build_fragment(inner, b, multiline, ci);
            let e = b.new_state();
            b.add_eps(f.end, f.start);
            b.add_eps(f.end, e);
            Fragment { start: f.start, end: e }
        }
        Ast::Optional(inner) => {
            let s = b.new_state();
            let e = b.new_state();
            let f = build_fragment(inner, b, multiline, ci);
            b.add_eps(s, f.start);
            b.add_eps(s, e);
            b.add_eps(f.end, e);
            Fragment { start: s, end: e }
        }
    }
}

fn epsilon_closure(nfa: &NfaBuilder, set: &mut BTreeSet<usize>) {
    let mut stack: Vec<usize> = set.iter().copied().collect();
    while let Some(s) = stack.pop() {
        for &t in &nfa.states[s].eps {
            if set.insert(t) {
                stack.push(t);
            }
        }
    }
}

/// Subset (powerset) construction: turns the NFA rooted at `nfa_start`,
/// whose sole accepting state is `nfa_accept`, into an equivalent DFA.
fn subset_construct(
    nfa: &NfaBuilder,
    nfa_start: usize,
    nfa_accept: usize,
    kind: TokenKind,
    priority: i32,
    max_states: usize,
) -> Result<DfaGraph, TokenizerError> {
    let mut graph = DfaGraph::empty(max_states);
    let mut dfa_of: HashMap<BTreeSet<usize>, StateId> = HashMap::new();
    let mut queue: VecDeque<BTreeSet<usize>> = VecDeque::new();

    let mut start_set = BTreeSet::new();
    start_set.insert(nfa_start);
    epsilon_closure(nfa, &mut start_set);

    let start_accept = start_set
        .contains(&nfa_accept)
        .then_some(Accept { kind, priority });
    let start_id = graph.add_state(start_accept)?;
    graph.set_start(start_id);
    dfa_of.insert(start_set.clone(), start_id);
    queue.push_back(start_set);

    while let Some(set) = queue.pop_front() {
        let from_id = dfa_of[&set];
        for byte in 0u16..=255 {
            let byte = byte as u8;
            let mut move_set = BTreeSet::new();
            for &s in &set {
                for (bs, to) in &nfa.states[s].on_byte {
                    if bs.0[byte as usize] {
                        move_set.insert(*to);
                    }
                }
            }
            if move_set.is_empty() {
                continue;
            }
            epsilon_closure(nfa, &mut move_set);

            let to_id = if let Some(&id) = dfa_of.get(&move_set) {
                id
            } else {
                let accept = move_set
                    .contains(&nfa_accept)
                    .then_some(Accept { kind, priority });
                let id = graph.add_state(accept)?;
                dfa_of.insert(move_set.clone(), id);
                queue.push_back(move_set);
                id
            };
            graph.add_transition(from_id, byte, to_id)?;
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> PatternFlags {
        PatternFlags::default()
    }

    #[test]
    fn literal_pattern_matches_exact_bytes() {
        let compiled = compile("abc", flags(), TokenKind::Identifier, 0).unwrap();
        let (len, accept) = compiled.matches_at(b"abcdef", 0).unwrap();
        assert_eq!(len, 3);
        assert_eq!(accept.kind, TokenKind::Identifier);
    }

    #[test]
    fn star_quantifier_is_greedy_longest_match() {
        let compiled = compile("[a-z]*", flags(), TokenKind::Identifier, 0).unwrap();
        let (len, _) = compiled.matches_at(b"hello123", 0).unwrap();
        assert_eq!(len, 5);
    }

    #[test]
    fn plus_quantifier_requires_one_occurrence() {
        let compiled = compile("[0-9]+", flags(), TokenKind::Number, 0).unwrap();
        assert!(compiled.matches_at(b"abc", 0).is_none());
        let (len, _) = compiled.matches_at(b"42x", 0).unwrap();
        assert_eq!(len, 2);
    }

    #[test]
    fn negated_class_excludes_listed_bytes() {
        let compiled = compile("[^0-9]+", flags(), TokenKind::Identifier, 0).unwrap();
        let (len, _) = compiled.matches_at(b"ab12", 0).unwrap();
        assert_eq!(len, 2);
    }

    #[test]
    fn start_anchor_only_matches_at_line_start() {
        let compiled = compile("^foo", flags(), TokenKind::Keyword, 0).unwrap();
        assert!(compiled.matches_at(b"xfoo", 1).is_none());
        let (len, _) = compiled.matches_at(b"foo", 0).unwrap();
        assert_eq!(len, 3);
    }

    #[test]
    fn multiline_start_anchor_matches_after_newline() {
        let mut f = flags();
        f.multiline = true;
        let compiled = compile("^bar", f, TokenKind::Keyword, 0).unwrap();
        let hay = b"foo\nbar";
        let (len, _) = compiled.matches_at(hay, 4).unwrap();
        assert_eq!(len, 3);
    }

    #[test]
    fn end_anchor_requires_end_of_input() {
        let compiled = compile("bar$", flags(), TokenKind::Keyword, 0).unwrap();
        assert!(compiled.matches_at(b"barx", 0).is_none());
        let (len, _) = compiled.matches_at(b"bar", 0).unwrap();
        assert_eq!(len, 3);
    }

    #[test]
    fn nullable_pattern_never_yields_a_zero_length_match() {
        let compiled = compile("[a-z]*", flags(), TokenKind::Identifier, 0).unwrap();
        assert!(compiled.matches_at(b"", 0).is_none());
        assert!(compiled.matches_at(b"123", 0).is_none());
    }

    #[test]
    fn optional_atom_matches_with_or_without_its_character() {
        let compiled = compile("a?", flags(), TokenKind::Identifier, 0).unwrap();
        let (len, _) = compiled.matches_at(b"abc", 0).unwrap();
        assert_eq!(len, 1);
        assert!(compiled.matches_at(b"xyz", 0).is_none());
    }

    #[test]
    fn case_insensitive_flag_matches_either_case() {
        let mut f = flags();
        f.case_insensitive = true;
        let compiled = compile("abc", f, TokenKind::Identifier, 0).unwrap();
        assert!(compiled.matches_at(b"ABC", 0).is_some());
    }

    #[test]
    fn unsupported_construct_is_rejected() {
        let err = compile("a(b)", flags(), TokenKind::Identifier, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPattern);
    }

    #[test]
    fn unterminated_class_is_rejected() {
        let err = compile("[abc", flags(), TokenKind::Identifier, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPattern);
    }
}
