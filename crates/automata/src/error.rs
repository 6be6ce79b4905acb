//! Error types shared by every engine operation.
//!
//! A rejected input string is not an error: it is a [`Simulation`](crate::Simulation) whose
//! `accepted` flag is `false`.

use std::time::Duration;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The automaton definition is malformed.
    #[error("invalid automaton structure: {0}")]
    InvalidAutomatonStructure(#[from] StructureError),

    /// A simulation input contains a symbol outside the automaton's alphabet.
    #[error("symbol {symbol:?} at input position {position} is not in the alphabet")]
    InvalidSymbol { symbol: String, position: usize },

    /// The operation was called on an automaton it is not defined for.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// A configured work bound was exceeded.
    #[error("size limit exceeded: {0}")]
    SizeLimitExceeded(LimitKind),
}

/// The specific structural defect found while building an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("the automaton declares no states")]
    NoStates,
    #[error("the alphabet is empty")]
    EmptyAlphabet,
    #[error("state and symbol names must not be empty")]
    EmptyName,
    #[error("name {0:?} cannot be written in the text format")]
    UnrepresentableName(String),
    #[error("state {0:?} is declared more than once")]
    DuplicateState(String),
    #[error("symbol {0:?} is declared more than once")]
    DuplicateSymbol(String),
    #[error("no start state was given")]
    MissingStartState,
    #[error("start state {0:?} is not a declared state")]
    UnknownStartState(String),
    #[error("final state {0:?} is not a declared state")]
    UnknownFinalState(String),
    #[error("transition {from},{symbol},{to} references undeclared state {state:?}")]
    UnknownTransitionState {
        from: String,
        symbol: String,
        to: String,
        state: String,
    },
    #[error("transition {from},{symbol},{to} uses a symbol outside the alphabet")]
    UnknownTransitionSymbol {
        from: String,
        symbol: String,
        to: String,
    },
    #[error("missing section {0:?}")]
    MissingSection(&'static str),
    #[error("line {line}: cannot parse {content:?}")]
    MalformedLine { line: usize, content: String },
}

/// Which configured bound was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LimitKind {
    #[error("more than {limit} states would be created")]
    States { limit: usize },
    #[error("input has {actual} states, conversion is capped at {limit}")]
    SourceStates { limit: usize, actual: usize },
    #[error("work did not finish within {limit:?}")]
    Deadline { limit: Duration },
}
