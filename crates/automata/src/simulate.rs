//! Traced, powerset-style execution of an input against an automaton.
//!
//! The simulator tracks the set of active states rather than individual runs, so
//! nondeterminism costs nothing extra: a branch that has no transition simply drops out of
//! the union. The input is rejected early only when no branch survives.

use crate::automaton::{Automaton, StateSet, SymbolId};
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// What a trace step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// The start configuration, before any input is consumed.
    Initial,
    /// One symbol was consumed and at least one state survived.
    Transition,
    /// The input was rejected, either because no state survived a symbol or because the
    /// input ended outside the final states.
    Reject,
    /// The input ended in at least one final state.
    Accept,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepKind::Initial => "initial",
            StepKind::Transition => "transition",
            StepKind::Reject => "reject",
            StepKind::Accept => "accept",
        })
    }
}

/// One entry of an execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub index: usize,
    /// The symbol consumed by this step; `None` for the initial and final verdict steps.
    pub symbol: Option<String>,
    /// Active states after the step, in declaration order.
    pub active: Vec<String>,
    pub kind: StepKind,
}

/// The outcome of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Simulation {
    pub accepted: bool,
    pub trace: Vec<Step>,
    /// The states active when the input ran out (empty if every branch died).
    pub final_states: Vec<String>,
}

impl Simulation {
    /// The last step, which always carries the verdict.
    pub fn verdict(&self) -> Option<&Step> {
        self.trace.last()
    }

    /// Active state sets, one per step, joined as `{a,b}` for display.
    pub fn path(&self) -> Vec<String> {
        self.trace
            .iter()
            .map(|step| format!("{{{}}}", step.active.join(",")))
            .collect()
    }
}

struct Recorder<'a> {
    automaton: &'a Automaton,
    trace: Vec<Step>,
}

impl Recorder<'_> {
    fn push(&mut self, symbol: Option<SymbolId>, active: &StateSet, kind: StepKind) {
        let step = Step {
            index: self.trace.len(),
            symbol: symbol.map(|s| self.automaton.symbol_name(s).to_string()),
            active: self
                .automaton
                .names_of(active)
                .into_iter()
                .map(str::to_string)
                .collect(),
            kind,
        };
        tracing::trace!(
            index = step.index,
            symbol = step.symbol.as_deref().unwrap_or("-"),
            active = ?step.active,
            kind = %step.kind,
            "simulation step"
        );
        self.trace.push(step);
    }
}

/// Run `input` (a sequence of alphabet symbols) through the automaton.
///
/// Every symbol is checked against the alphabet before anything runs, so an unknown symbol
/// is reported as [`Error::InvalidSymbol`] wherever it sits in the input, never as a
/// rejection.
pub fn simulate<I, S>(automaton: &Automaton, input: I) -> Result<Simulation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let symbols = input
        .into_iter()
        .enumerate()
        .map(|(position, symbol)| {
            let symbol = symbol.as_ref();
            automaton
                .symbol_id(symbol)
                .ok_or_else(|| Error::InvalidSymbol {
                    symbol: symbol.to_string(),
                    position,
                })
        })
        .collect::<Result<Vec<SymbolId>>>()?;

    let mut recorder = Recorder {
        automaton,
        trace: Vec::with_capacity(symbols.len() + 2),
    };

    let mut active = StateSet::singleton(automaton.start_id(), automaton.num_states());
    recorder.push(None, &active, StepKind::Initial);

    for &symbol in &symbols {
        let next = automaton.move_on_symbol(&active, symbol);
        if next.is_empty() {
            recorder.push(Some(symbol), &next, StepKind::Reject);
            tracing::debug!(
                input_len = symbols.len(),
                steps = recorder.trace.len(),
                "rejected: no surviving state"
            );
            return Ok(Simulation {
                accepted: false,
                trace: recorder.trace,
                final_states: Vec::new(),
            });
        }
        active = next;
        recorder.push(Some(symbol), &active, StepKind::Transition);
    }

    let accepted = active.intersects(automaton.final_set());
    let verdict = if accepted {
        StepKind::Accept
    } else {
        StepKind::Reject
    };
    recorder.push(None, &active, verdict);

    tracing::debug!(input_len = symbols.len(), accepted, "simulation finished");
    Ok(Simulation {
        accepted,
        trace: recorder.trace,
        final_states: automaton
            .names_of(&active)
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// Simulate a string whose every `char` is one symbol, the convention of the text format.
pub fn simulate_chars(automaton: &Automaton, input: &str) -> Result<Simulation> {
    simulate(automaton, input.chars().map(String::from))
}

impl Automaton {
    /// Whether the automaton accepts `input`, without keeping the trace.
    pub fn accepts<I, S>(&self, input: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        simulate(self, input).map(|run| run.accepted)
    }
}
