//! The DFA graph (C2): one state machine per compiled pattern, built once by
//! the pattern compiler and never mutated afterward. Transition tables are
//! boxed `[Option<StateId>; 256]` arrays, matching the fixed-size
//! `transitions[256]` table in the original `DFAState`
//! (`examples/original_source/rift-0/include/rift-0/core/lexer/tokenizer_types.h`).

use std::collections::VecDeque;

use crate::error::{ErrorKind, TokenizerError};
use crate::token::TokenKind;

/// Default ceiling on the number of states a single pattern's DFA may use,
/// carried over from the original `DFA_MAX_STATES` constant.
pub const DFA_MAX_STATES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accept {
    pub kind: TokenKind,
    pub priority: i32,
}

struct DfaState {
    accept: Option<Accept>,
    transitions: Box<[Option<StateId>; 256]>,
}

impl DfaState {
    fn new() -> Self {
        Self {
            accept: None,
            transitions: Box::new([None; 256]),
        }
    }
}

/// A deterministic finite automaton over bytes. A graph owns every state it
/// reaches; there is no sharing between graphs of different patterns.
pub struct DfaGraph {
    states: Vec<DfaState>,
    start: StateId,
    max_states: usize,
}

impl DfaGraph {
    /// An empty graph with no states yet; the first state added via
    /// [`DfaGraph::add_state`] should be marked as the start with
    /// [`DfaGraph::set_start`].
    pub fn empty(max_states: usize) -> Self {
        Self {
            states: Vec::new(),
            start: StateId(0),
            max_states,
        }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn set_start(&mut self, state: StateId) {
        self.start = state;
    }

    pub fn add_state(&mut self, accept: Option<Accept>) -> Result<StateId, TokenizerError> {
        if self.states.len() >= self.max_states {
            return Err(TokenizerError::new(
                ErrorKind::CapacityExhausted,
                format!("DFA state limit of {} reached", self.max_states),
            ));
        }
        let id = StateId(self.states.len() as u32);
        let mut state = DfaState::new();
        state.accept = accept;
        self.states.push(state);
        Ok(id)
    }

    /// Adds a transition, rejecting a second distinct target for the same
    /// `(state, byte)` pair as a determinism violation. Registering the
    /// same transition twice with the same target is a no-op.
    pub fn add_transition(
        &mut self,
        from: StateId,
        byte: u8,
        to: StateId,
    ) -> Result<(), TokenizerError> {
        let slot = &mut self.states[from.index()].transitions[byte as usize];
        match slot {
            Some(existing) if *existing != to => Err(TokenizerError::new(
                ErrorKind::DeterminismViolation,
                format!(
                    "state {} already has a transition on byte {} to {}",
                    from.0, byte, existing.0
                ),
            )),
            Some(_) => Ok(()),
            None => {
                *slot = Some(to);
                Ok(())
            }
        }
    }

    pub fn step(&self, from: StateId, byte: u8) -> Option<StateId> {
        self.states[from.index()].transitions[byte as usize]
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.states[state.index()].accept.is_some()
    }

    pub fn accept(&self, state: StateId) -> Option<Accept> {
        self.states[state.index()].accept
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Simulates from `start` over `input`, returning every prefix length at
    /// which the automaton was in an accepting state, in increasing order.
    /// The pattern compiler's anchor handling decides which of these
    /// prefixes is a legal match; the DFA itself has no notion of anchors.
    pub fn accepting_prefixes(&self, start: StateId, input: &[u8]) -> Vec<(usize, Accept)> {
        let mut state = start;
        let mut out = Vec::new();
        if let Some(accept) = self.accept(state) {
            out.push((0, accept));
        }
        for (i, &byte) in input.iter().enumerate() {
            match self.step(state, byte) {
                Some(next) => {
                    state = next;
                    if let Some(accept) = self.accept(state) {
                        out.push((i + 1, accept));
                    }
                }
                None => break,
            }
        }
        out
    }

    /// Breadth-first walk of every state reachable from `start`. The graph
    /// owns its states exclusively, so dropping the graph already releases
    /// them; this exists to make the reachability invariant checkable.
    pub fn reachable_from(&self, start: StateId) -> Vec<StateId> {
        let mut visited = vec![false; self.states.len()];
        let mut queue = VecDeque::new();
        let mut order = Vec::new();
        queue.push_back(start);
        visited[start.index()] = true;
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for next in self.states[id.index()].transitions.iter().flatten() {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    queue.push_back(*next);
                }
            }
        }
        order
    }

    /// A short indented-text dump of states and transitions for debug
    /// logging. No graphviz/`ptree` dependency: the teacher's own AST
    /// pretty-printer uses `ptree`, but nothing in this crate still needs a
    /// tree renderer once the AST layer is gone.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (id, state) in self.states.iter().enumerate() {
            let accept = state
                .accept
                .map(|a| format!(" accept={:?}(p{})", a.kind, a.priority))
                .unwrap_or_default();
            out.push_str(&format!("state {}{}\n", id, accept));
            for (byte, to) in state.transitions.iter().enumerate() {
                if let Some(to) = to {
                    out.push_str(&format!("  {:?} -> {}\n", byte as u8 as char, to.0));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_transition_accepts() {
        let mut graph = DfaGraph::empty(DFA_MAX_STATES);
        let s0 = graph.add_state(None).unwrap();
        let s1 = graph
            .add_state(Some(Accept {
                kind: TokenKind::Identifier,
                priority: 0,
            }))
            .unwrap();
        graph.set_start(s0);
        graph.add_transition(s0, b'a', s1).unwrap();

        let prefixes = graph.accepting_prefixes(graph.start(), b"a");
        assert_eq!(
            prefixes,
            vec![(
                1,
                Accept {
                    kind: TokenKind::Identifier,
                    priority: 0
                }
            )]
        );
    }

    #[test]
    fn conflicting_transition_is_determinism_violation() {
        let mut graph = DfaGraph::empty(DFA_MAX_STATES);
        let s0 = graph.add_state(None).unwrap();
        let s1 = graph.add_state(None).unwrap();
        let s2 = graph.add_state(None).unwrap();
        graph.add_transition(s0, b'a', s1).unwrap();
        let err = graph.add_transition(s0, b'a', s2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeterminismViolation);
    }

    #[test]
    fn state_ceiling_is_enforced() {
        let mut graph = DfaGraph::empty(1);
        graph.add_state(None).unwrap();
        let err = graph.add_state(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExhausted);
    }

    #[test]
    fn reachable_from_excludes_unreachable_states() {
        let mut graph = DfaGraph::empty(DFA_MAX_STATES);
        let s0 = graph.add_state(None).unwrap();
        let s1 = graph.add_state(None).unwrap();
        let _unreachable = graph.add_state(None).unwrap();
        graph.add_transition(s0, b'x', s1).unwrap();
        let reached = graph.reachable_from(s0);
        assert_eq!(reached, vec![s0, s1]);
    }
}
