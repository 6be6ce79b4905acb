//! Subset construction algorithm for converting an NFA to a DFA.

use crate::automaton::{Automaton, NameTable, StateId, StateSet, SymbolId};
use crate::budget::Budget;
use crate::classify::analyze;
use crate::config::{EngineConfig, SinkPolicy};
use crate::error::{Error, LimitKind, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::VecDeque;

/// Name given to the synthesized sink state. Subset names always start with `{`, so it
/// cannot collide with one.
pub const SINK_STATE: &str = "∅";

/// The result of a subset construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    /// The deterministic automaton. Total only if the input covered every pair or a sink was
    /// synthesized.
    pub automaton: Automaton,
    /// For every new state, the source states it stands for (the sink stands for none).
    pub provenance: IndexMap<String, Vec<String>>,
    /// Name of the synthesized sink state, if one was added.
    pub sink: Option<String>,
}

/// Convert an automaton to a branch-free one using the powerset construction algorithm.
///
/// Subsets are discovered breadth-first from `{start}` and symbols are visited in alphabet
/// order, so identical inputs always produce identically numbered and named states.
pub fn subset_construction(nfa: &Automaton, config: &EngineConfig) -> Result<Conversion> {
    check_source_size(nfa, config)?;

    let mut budget = Budget::new(&config.limits);
    // Each DFA state corresponds to a set of NFA states; the map index is the DFA state id.
    let mut subsets: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut finals = StateSet::default();
    let mut edges: Vec<(StateId, SymbolId, StateId)> = Vec::new();
    let mut missing: Vec<(StateId, SymbolId)> = Vec::new();
    let mut worklist: VecDeque<StateId> = VecDeque::new();

    let initial = StateSet::singleton(nfa.start_id(), nfa.num_states());
    budget.charge_state()?;
    if initial.intersects(nfa.final_set()) {
        finals.insert(0);
    }
    subsets.insert(initial, 0);
    worklist.push_back(0);

    while let Some(current) = worklist.pop_front() {
        budget.check()?;
        let Some((current_set, _)) = subsets.get_index(current as usize) else {
            continue;
        };
        let current_set = current_set.clone();

        for symbol in nfa.symbol_ids() {
            let next_set = nfa.move_on_symbol(&current_set, symbol);

            if next_set.is_empty() {
                // No transition on this symbol; the result stays partial here.
                missing.push((current, symbol));
                continue;
            }

            let next = match subsets.get(&next_set) {
                Some(&existing) => existing,
                None => {
                    budget.charge_state()?;
                    let id = subsets.len() as StateId;
                    if next_set.intersects(nfa.final_set()) {
                        finals.insert(id);
                    }
                    tracing::trace!(id, subset = ?next_set, "new subset");
                    subsets.insert(next_set, id);
                    worklist.push_back(id);
                    id
                }
            };

            edges.push((current, symbol, next));
        }
    }

    let mut states = NameTable::new();
    let mut provenance = IndexMap::with_capacity(subsets.len() + 1);
    for subset in subsets.keys() {
        let members: Vec<String> = nfa
            .names_of(subset)
            .into_iter()
            .map(str::to_string)
            .collect();
        let name = insert_unique(&mut states, format!("{{{}}}", members.join(";")));
        provenance.insert(name, members);
    }

    let sink = match config.sink {
        SinkPolicy::Synthesize if !missing.is_empty() => {
            budget.charge_state()?;
            let sink_id = states.len() as StateId;
            let name = insert_unique(&mut states, SINK_STATE.to_string());
            provenance.insert(name.clone(), Vec::new());
            edges.extend(missing.iter().map(|&(state, symbol)| (state, symbol, sink_id)));
            edges.extend(nfa.symbol_ids().map(|symbol| (sink_id, symbol, sink_id)));
            Some(name)
        }
        _ => None,
    };

    let automaton = Automaton::from_parts(states, nfa.alphabet_table().clone(), 0, finals, edges);
    tracing::debug!(
        source_states = nfa.num_states(),
        states = automaton.num_states(),
        partial_pairs = if sink.is_some() { 0 } else { missing.len() },
        sink = sink.is_some(),
        "subset construction finished"
    );

    Ok(Conversion {
        automaton,
        provenance,
        sink,
    })
}

/// Convert an automaton to a branch-free one, discarding the provenance.
pub fn to_dfa(nfa: &Automaton, config: &EngineConfig) -> Result<Automaton> {
    subset_construction(nfa, config).map(|conversion| conversion.automaton)
}

/// Intern `name`, priming it until it is unused, and return the name actually taken.
///
/// Member names may themselves contain `;` or braces, so two different subsets can render
/// to the same text.
fn insert_unique(states: &mut NameTable, mut name: String) -> String {
    while states.insert(name.as_str()).is_none() {
        name.push('\'');
    }
    name
}

/// Refuse branching inputs above the configured source-size bound.
///
/// Branch-free inputs are exempt: every subset they reach is a singleton, so their
/// conversion is linear.
fn check_source_size(nfa: &Automaton, config: &EngineConfig) -> Result<()> {
    let Some(limit) = config.limits.max_source_states else {
        return Ok(());
    };
    let actual = nfa.num_states();
    if actual > limit && !analyze(nfa).is_branch_free() {
        tracing::warn!(actual, limit, "refusing subset construction");
        return Err(Error::SizeLimitExceeded(LimitKind::SourceStates {
            limit,
            actual,
        }));
    }
    Ok(())
}
