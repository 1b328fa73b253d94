//! The dual-channel router (C7): a pure function over an already-tagged
//! token sequence. It reads the `QUANTUM` flag the scanner set at scan time
//! and the fixed quantum-marker kinds; it has no state of its own and never
//! mutates a token already held in a buffer (tokens are `Copy`, so a
//! governance-tagged token's flag bit is set on a fresh copy).

use crate::token::{Token, TokenFlags, TokenKind};

/// Splits `tokens` into `(classical, quantum)`, preserving the relative
/// order within each channel. A token is routed to the quantum channel if
/// its kind is one of the fixed quantum-marker kinds, or if the scanner
/// tagged it with the `QUANTUM` flag while the sticky mode was active.
/// Governance-tag tokens stay on the classical channel but always carry
/// the `GOVERNANCE` flag bit on the copy returned here.
pub fn route(tokens: &[Token]) -> (Vec<Token>, Vec<Token>) {
    let mut classical = Vec::with_capacity(tokens.len());
    let mut quantum = Vec::new();

    for &token in tokens {
        let is_quantum = token.kind().is_quantum() || token.flags().contains(TokenFlags::QUANTUM);
        if is_quantum {
            quantum.push(token);
        } else if token.kind() == TokenKind::GovernanceTag {
            classical.push(token.with_flags(token.flags().union(TokenFlags::GOVERNANCE)));
        } else {
            classical.push(token);
        }
    }

    (classical, quantum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantum_marker_kind_always_routes_to_quantum_channel() {
        let tokens = vec![Token::new(
            TokenKind::QuantumMarker,
            0,
            1,
            TokenFlags::CLASSICAL,
        )];
        let (classical, quantum) = route(&tokens);
        assert!(classical.is_empty());
        assert_eq!(quantum.len(), 1);
    }

    #[test]
    fn quantum_flag_routes_ordinary_kinds_to_quantum_channel() {
        let tokens = vec![Token::new(
            TokenKind::Identifier,
            0,
            3,
            TokenFlags::QUANTUM,
        )];
        let (classical, quantum) = route(&tokens);
        assert!(classical.is_empty());
        assert_eq!(quantum.len(), 1);
    }

    #[test]
    fn governance_tag_stays_classical_with_flag_set() {
        let tokens = vec![Token::new(
            TokenKind::GovernanceTag,
            0,
            4,
            TokenFlags::CLASSICAL,
        )];
        let (classical, quantum) = route(&tokens);
        assert!(quantum.is_empty());
        assert_eq!(classical.len(), 1);
        assert!(classical[0].flags().contains(TokenFlags::GOVERNANCE));
    }

    #[test]
    fn relative_order_is_preserved_within_each_channel() {
        let tokens = vec![
            Token::new(TokenKind::Identifier, 0, 1, TokenFlags::CLASSICAL),
            Token::new(TokenKind::QuantumMarker, 1, 1, TokenFlags::NONE),
            Token::new(TokenKind::Number, 2, 1, TokenFlags::CLASSICAL),
            Token::new(TokenKind::CollapseMarker, 3, 1, TokenFlags::NONE),
        ];
        let (classical, quantum) = route(&tokens);
        assert_eq!(
            classical.iter().map(Token::offset).collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert_eq!(
            quantum.iter().map(Token::offset).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }
}
