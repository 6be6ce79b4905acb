//! DFA / NFA classification.
//!
//! An automaton is a DFA only when its transition relation is a total function: every
//! `(state, symbol)` pair has exactly one target. A pair with several targets or with none
//! makes it an NFA. [`Determinism`] keeps both kinds of defect apart for callers that need
//! to tell "branching" from "merely partial".

use crate::automaton::Automaton;
use serde::Serialize;
use std::fmt;

/// The classification of an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    #[serde(rename = "DFA")]
    Dfa,
    #[serde(rename = "NFA")]
    Nfa,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Dfa => "DFA",
            Kind::Nfa => "NFA",
        })
    }
}

/// Per-pair determinism report for an automaton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Determinism {
    /// `(state, symbol)` pairs with more than one target.
    pub branching: Vec<(String, String)>,
    /// `(state, symbol)` pairs with no target.
    pub missing: Vec<(String, String)>,
}

impl Determinism {
    /// No pair has more than one target.
    pub fn is_branch_free(&self) -> bool {
        self.branching.is_empty()
    }

    /// Every pair has at least one target.
    pub fn is_total(&self) -> bool {
        self.missing.is_empty()
    }

    /// DFA exactly when the automaton is branch-free and total.
    pub fn kind(&self) -> Kind {
        if self.is_branch_free() && self.is_total() {
            Kind::Dfa
        } else {
            Kind::Nfa
        }
    }
}

/// Inspect every `(state, symbol)` pair of the automaton.
pub fn analyze(automaton: &Automaton) -> Determinism {
    let mut report = Determinism::default();

    for state in automaton.state_ids() {
        for symbol in automaton.symbol_ids() {
            let count = automaton.targets_of(state, symbol).map_or(0, |t| t.len());
            let pair = || {
                (
                    automaton.state_name(state).to_string(),
                    automaton.symbol_name(symbol).to_string(),
                )
            };
            match count {
                0 => report.missing.push(pair()),
                1 => {}
                _ => report.branching.push(pair()),
            }
        }
    }

    tracing::trace!(
        branching = report.branching.len(),
        missing = report.missing.len(),
        "analyzed determinism"
    );
    report
}

/// Classify an automaton as DFA or NFA.
pub fn classify(automaton: &Automaton) -> Kind {
    let kind = analyze(automaton).kind();
    tracing::debug!(%kind, states = automaton.num_states(), "classified automaton");
    kind
}
