//! Finite automaton engine.
//!
//! Build an [`Automaton`] (directly, through [`AutomatonBuilder`], from the text format via
//! `str::parse`, or with serde), then:
//! - [`simulate()`] an input with a full execution trace,
//! - [`classify()`] it as DFA or NFA,
//! - convert it with [`subset_construction()`] / [`to_dfa`],
//! - [`minimize()`] a total DFA.
//!
//! Every operation is a pure function of its inputs. Bounds on the combinatorial work are
//! set through [`EngineConfig`].

pub mod automaton;
pub mod budget;
pub mod classify;
pub mod config;
pub mod error;
pub mod minimize;
pub mod simulate;
pub mod subset_construction;

#[cfg(test)]
mod tests;

pub use automaton::{Automaton, AutomatonBuilder};
pub use classify::{Determinism, Kind, analyze, classify};
pub use config::{EngineConfig, Limits, SinkPolicy};
pub use error::{Error, LimitKind, Result, StructureError};
pub use minimize::{Minimization, minimization, minimize, minimize_nfa};
pub use simulate::{Simulation, Step, StepKind, simulate, simulate_chars};
pub use subset_construction::{Conversion, subset_construction, to_dfa};
