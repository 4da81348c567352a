//! Candidate-pair universe.
//!
//! Parses pair lists from configuration (`KO/PEP,XOM/CVX,...`) and provides
//! the default universe used when none is configured.

use crate::domain::error::PairtraderError;
use std::collections::HashSet;
use std::fmt;

/// Two symbols hypothesized to be cointegrated. `symbol_a` is regressed on
/// `symbol_b` when fitting the hedge ratio, so order matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairCandidate {
    pub symbol_a: String,
    pub symbol_b: String,
}

impl PairCandidate {
    pub fn new(symbol_a: &str, symbol_b: &str) -> Self {
        PairCandidate {
            symbol_a: symbol_a.to_string(),
            symbol_b: symbol_b.to_string(),
        }
    }
}

impl fmt::Display for PairCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbol_a, self.symbol_b)
    }
}

pub fn default_universe() -> Vec<PairCandidate> {
    vec![
        PairCandidate::new("KO", "PEP"),
        PairCandidate::new("XOM", "CVX"),
        PairCandidate::new("V", "MA"),
        PairCandidate::new("JPM", "BAC"),
        PairCandidate::new("AAPL", "MSFT"),
    ]
}

/// Parse a single `A/B` pair spec: trimmed, uppercased, both sides required
/// and distinct.
pub fn parse_pair(spec: &str) -> Result<PairCandidate, PairtraderError> {
    let invalid = |reason: &str| PairtraderError::InvalidPair {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = spec.split('/');
    let (Some(first), Some(second), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid("expected exactly one '/'"));
    };

    let symbol_a = first.trim().to_uppercase();
    let symbol_b = second.trim().to_uppercase();
    if symbol_a.is_empty() || symbol_b.is_empty() {
        return Err(invalid("empty symbol"));
    }
    if symbol_a == symbol_b {
        return Err(invalid("a pair needs two distinct symbols"));
    }

    Ok(PairCandidate {
        symbol_a,
        symbol_b,
    })
}

/// Parse a comma-separated pair list, rejecting empty tokens and exact
/// duplicates. Reversed pairs (`PEP/KO` after `KO/PEP`) are distinct
/// candidates since the hedge direction differs.
pub fn parse_pairs(input: &str) -> Result<Vec<PairCandidate>, PairtraderError> {
    let mut pairs = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(PairtraderError::InvalidPair {
                spec: input.to_string(),
                reason: "empty token in pair list".to_string(),
            });
        }
        let pair = parse_pair(trimmed)?;
        if !seen.insert(pair.clone()) {
            return Err(PairtraderError::InvalidPair {
                spec: input.to_string(),
                reason: format!("duplicate pair {pair}"),
            });
        }
        pairs.push(pair);
    }

    Ok(pairs)
}
