//! DFA minimization by partition refinement.
//!
//! The partition starts as `{final, non-final}` and is refined with a worklist of splitter
//! blocks: for each popped block `A` and each symbol, every block `Y` is split into the
//! states that move into `A` and those that do not. When a split block is still waiting in
//! the worklist both halves replace it; otherwise only the smaller half is enqueued.

use crate::automaton::{Automaton, NameTable, StateId, StateSet, SymbolId};
use crate::budget::Budget;
use crate::classify::analyze;
use crate::config::{EngineConfig, SinkPolicy};
use crate::error::{Error, Result};
use crate::subset_construction::subset_construction;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::VecDeque;

/// The result of a minimization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Minimization {
    pub automaton: Automaton,
    /// For every new state, the original states merged into it.
    pub provenance: IndexMap<String, Vec<String>>,
}

/// Minimize a total DFA.
///
/// New states are named `q0`, `q1`, … in breadth-first order from the start block, visiting
/// symbols in alphabet order, so equivalent inputs produce identical outputs.
pub fn minimization(dfa: &Automaton, config: &EngineConfig) -> Result<Minimization> {
    check_precondition(dfa)?;

    let mut budget = Budget::new(&config.limits);
    let universe = if config.prune_unreachable {
        dfa.reachable_set()
    } else {
        StateSet::full(dfa.num_states())
    };

    let partition = refine(dfa, &universe, &budget)?;
    let minimized = build_minimized_dfa(dfa, &partition, &mut budget)?;

    tracing::debug!(
        states = dfa.num_states(),
        considered = universe.len(),
        minimized = minimized.automaton.num_states(),
        "minimization finished"
    );
    Ok(minimized)
}

/// Minimize a total DFA, discarding the provenance.
pub fn minimize(dfa: &Automaton, config: &EngineConfig) -> Result<Automaton> {
    minimization(dfa, config).map(|m| m.automaton)
}

/// Convert any automaton to its minimal DFA: subset construction with a synthesized sink,
/// then minimization.
///
/// The provenance maps every minimized state straight back to the states of `nfa` it
/// stands for, without duplicates and in declaration order. The sink stands for none.
pub fn minimize_nfa(nfa: &Automaton, config: &EngineConfig) -> Result<Minimization> {
    let config = config.clone().with_sink(SinkPolicy::Synthesize);
    let conversion = subset_construction(nfa, &config)?;
    let minimized = minimization(&conversion.automaton, &config)?;

    let provenance: IndexMap<String, Vec<String>> = minimized
        .provenance
        .into_iter()
        .map(|(state, merged)| {
            let mut originals = nfa.empty_set();
            for original in merged
                .iter()
                .filter_map(|subset| conversion.provenance.get(subset))
                .flatten()
                .filter_map(|name| nfa.state_id(name))
            {
                originals.insert(original);
            }
            let names: Vec<String> = nfa
                .names_of(&originals)
                .into_iter()
                .map(str::to_string)
                .collect();
            (state, names)
        })
        .collect();

    Ok(Minimization {
        automaton: minimized.automaton,
        provenance,
    })
}

fn check_precondition(dfa: &Automaton) -> Result<()> {
    let report = analyze(dfa);
    if !report.is_branch_free() {
        return Err(Error::PreconditionViolation(format!(
            "minimization needs a DFA, but {} (state, symbol) pairs have several targets",
            report.branching.len()
        )));
    }
    if !report.is_total() {
        return Err(Error::PreconditionViolation(format!(
            "minimization needs a total DFA, but {} (state, symbol) pairs have no target",
            report.missing.len()
        )));
    }
    Ok(())
}

/// Refine `{final, non-final}` (restricted to `universe`) until no block splits.
fn refine(dfa: &Automaton, universe: &StateSet, budget: &Budget) -> Result<Vec<StateSet>> {
    let accepting = universe.intersection(dfa.final_set());
    let rejecting = universe.difference(dfa.final_set());

    let mut worklist: Vec<StateSet> = Vec::new();
    match (accepting.is_empty(), rejecting.is_empty()) {
        (false, false) if rejecting.len() < accepting.len() => worklist.push(rejecting.clone()),
        (false, false) => worklist.push(accepting.clone()),
        _ => {}
    }

    let mut partition: Vec<StateSet> = [accepting, rejecting]
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect();

    while let Some(splitter) = worklist.pop() {
        budget.check()?;

        for symbol in dfa.symbol_ids() {
            let predecessors = dfa.predecessors(&splitter, symbol);
            if predecessors.is_empty() {
                continue;
            }

            // Halves produced in this pass are never split again by the same predecessors.
            for idx in 0..partition.len() {
                let inside = partition[idx].intersection(&predecessors);
                if inside.is_empty() || inside.len() == partition[idx].len() {
                    continue;
                }
                let outside = partition[idx].difference(&predecessors);
                let block = std::mem::replace(&mut partition[idx], inside.clone());
                partition.push(outside.clone());

                if let Some(pos) = worklist.iter().position(|pending| *pending == block) {
                    worklist[pos] = inside;
                    worklist.push(outside);
                } else if inside.len() <= outside.len() {
                    worklist.push(inside);
                } else {
                    worklist.push(outside);
                }
                tracing::trace!(symbol, blocks = partition.len(), "split block");
            }
        }
    }

    Ok(partition)
}

/// Build a minimized DFA from a stable partition.
fn build_minimized_dfa(
    dfa: &Automaton,
    partition: &[StateSet],
    budget: &mut Budget,
) -> Result<Minimization> {
    // Map old states to their block.
    let mut block_of: Vec<Option<usize>> = vec![None; dfa.num_states()];
    for (idx, block) in partition.iter().enumerate() {
        for state in block.iter() {
            block_of[state as usize] = Some(idx);
        }
    }
    let block_of_state = |state: StateId| block_of.get(state as usize).copied().flatten();

    // Representative state of each block, used for its outgoing transitions.
    let target_block = |block: usize, symbol: SymbolId| {
        partition[block]
            .first()
            .and_then(|rep| dfa.targets_of(rep, symbol))
            .and_then(StateSet::first)
            .and_then(block_of_state)
    };

    // Number blocks breadth-first from the start block.
    let mut new_id: Vec<Option<StateId>> = vec![None; partition.len()];
    let mut order: Vec<usize> = Vec::with_capacity(partition.len());
    let start_block = block_of_state(dfa.start_id()).ok_or_else(|| {
        Error::PreconditionViolation("start state is missing from the partition".to_string())
    })?;
    let mut queue = VecDeque::from([start_block]);
    new_id[start_block] = Some(0);
    while let Some(block) = queue.pop_front() {
        order.push(block);
        for symbol in dfa.symbol_ids() {
            if let Some(next) = target_block(block, symbol) {
                if new_id[next].is_none() {
                    new_id[next] = Some((order.len() + queue.len()) as StateId);
                    queue.push_back(next);
                }
            }
        }
    }

    // Blocks the start cannot reach (only kept when pruning is off), by lowest member.
    let mut unreached: Vec<usize> = (0..partition.len())
        .filter(|&block| new_id[block].is_none())
        .collect();
    unreached.sort_by_key(|&block| partition[block].first());
    for block in unreached {
        new_id[block] = Some(order.len() as StateId);
        order.push(block);
    }

    let mut states = NameTable::new();
    let mut provenance = IndexMap::with_capacity(order.len());
    let mut finals = StateSet::with_capacity(order.len());
    let mut edges = Vec::with_capacity(order.len() * dfa.num_symbols());

    for (id, &block) in order.iter().enumerate() {
        budget.charge_state()?;
        let name = format!("q{id}");
        states.insert(name.clone());
        provenance.insert(
            name,
            dfa.names_of(&partition[block])
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>(),
        );

        if partition[block].is_subset(dfa.final_set()) {
            finals.insert(id as StateId);
        }

        for symbol in dfa.symbol_ids() {
            if let Some(target) = target_block(block, symbol).and_then(|b| new_id[b]) {
                edges.push((id as StateId, symbol, target));
            }
        }
    }

    let automaton = Automaton::from_parts(states, dfa.alphabet_table().clone(), 0, finals, edges);
    Ok(Minimization {
        automaton,
        provenance,
    })
}
