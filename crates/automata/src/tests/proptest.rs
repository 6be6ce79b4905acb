use crate::{
    Automaton, EngineConfig, Kind, analyze, classify, minimize, simulate, subset_construction,
    to_dfa,
};
use proptest::{collection, prelude::*};
use std::collections::{HashMap, HashSet};

const SYMBOLS: [&str; 3] = ["a", "b", "c"];

/// A word over the first `symbols` letters of [`SYMBOLS`].
fn word(raw: &[usize], symbols: usize) -> Vec<&'static str> {
    raw.iter().map(|&i| SYMBOLS[i % symbols]).collect()
}

fn build(
    states: usize,
    symbols: usize,
    targets: impl Fn(usize, usize) -> Vec<usize>,
    finals: &[bool],
) -> Automaton {
    let names: Vec<String> = (0..states).map(|i| format!("s{i}")).collect();
    let mut edges = Vec::new();
    for from in 0..states {
        for symbol in 0..symbols {
            for to in targets(from, symbol) {
                edges.push((names[from].as_str(), SYMBOLS[symbol], names[to].as_str()));
            }
        }
    }
    Automaton::build(
        names.iter().map(String::as_str),
        SYMBOLS[..symbols].iter().copied(),
        edges,
        "s0",
        names
            .iter()
            .zip(finals)
            .filter(|(_, fin)| **fin)
            .map(|(name, _)| name.as_str()),
    )
    .unwrap()
}

prop_compose! {
    /// Any automaton: each (state, symbol) pair gets an arbitrary subset of targets.
    fn arb_nfa()(states in 1usize..=5, symbols in 1usize..=3)
        (edges in collection::vec(collection::vec(any::<bool>(), states), states * symbols),
         finals in collection::vec(any::<bool>(), states),
         states in Just(states),
         symbols in Just(symbols)) -> (Automaton, usize) {
        let nfa = build(
            states,
            symbols,
            |from, symbol| {
                edges[from * symbols + symbol]
                    .iter()
                    .enumerate()
                    .filter(|(_, on)| **on)
                    .map(|(to, _)| to)
                    .collect()
            },
            &finals,
        );
        (nfa, symbols)
    }
}

prop_compose! {
    /// A total DFA: each (state, symbol) pair gets exactly one target.
    fn arb_dfa()(states in 1usize..=7, symbols in 1usize..=3)
        (edges in collection::vec(0..states, states * symbols),
         finals in collection::vec(any::<bool>(), states),
         states in Just(states),
         symbols in Just(symbols)) -> (Automaton, usize) {
        let dfa = build(states, symbols, |from, symbol| vec![edges[from * symbols + symbol]], &finals);
        (dfa, symbols)
    }
}

/// Count the equivalence classes of the reachable states of a total DFA by naive Moore
/// refinement: split on (class, class of each successor) until the count settles.
fn moore_class_count(dfa: &Automaton) -> usize {
    let reachable = dfa.reachable_states();
    let symbols: Vec<&str> = dfa.alphabet().collect();
    let position = |name: &str| reachable.iter().position(|state| *state == name).unwrap();

    let mut class: Vec<usize> = reachable
        .iter()
        .map(|state| usize::from(dfa.is_final(state)))
        .collect();
    let mut count = class.iter().collect::<HashSet<_>>().len();
    loop {
        let mut ids: HashMap<Vec<usize>, usize> = HashMap::new();
        let next: Vec<usize> = reachable
            .iter()
            .enumerate()
            .map(|(idx, state)| {
                let mut signature = vec![class[idx]];
                for symbol in &symbols {
                    let target = dfa.targets(state, symbol)[0];
                    signature.push(class[position(target)]);
                }
                let fresh = ids.len();
                *ids.entry(signature).or_insert(fresh)
            })
            .collect();
        if ids.len() == count {
            return count;
        }
        count = ids.len();
        class = next;
    }
}

fn arb_words() -> impl Strategy<Value = Vec<Vec<usize>>> {
    collection::vec(collection::vec(0usize..3, 0..8), 1..16)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn simulation_is_deterministic((nfa, symbols) in arb_nfa(), raw in collection::vec(0usize..3, 0..10)) {
        let input = word(&raw, symbols);
        let first = simulate(&nfa, &input).unwrap();
        let second = simulate(&nfa, &input).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn trace_shape((nfa, symbols) in arb_nfa(), raw in collection::vec(0usize..3, 0..10)) {
        let input = word(&raw, symbols);
        let run = simulate(&nfa, &input).unwrap();
        let last = run.verdict().unwrap();
        if last.active.is_empty() {
            // Died early: initial + consumed symbols, the last of which emptied the set.
            prop_assert!(!run.accepted);
            prop_assert!(run.trace.len() <= input.len() + 1);
        } else {
            prop_assert_eq!(run.trace.len(), input.len() + 2);
        }
        for (idx, step) in run.trace.iter().enumerate() {
            prop_assert_eq!(step.index, idx);
        }
    }

    #[test]
    fn conversion_preserves_language((nfa, symbols) in arb_nfa(), words in arb_words()) {
        let dfa = to_dfa(&nfa, &EngineConfig::default()).unwrap();
        for raw in &words {
            let input = word(raw, symbols);
            prop_assert_eq!(
                simulate(&nfa, &input).unwrap().accepted,
                simulate(&dfa, &input).unwrap().accepted
            );
        }
    }

    #[test]
    fn conversion_never_branches((nfa, _) in arb_nfa()) {
        let conversion = subset_construction(&nfa, &EngineConfig::default()).unwrap();
        prop_assert!(analyze(&conversion.automaton).is_branch_free());
        prop_assert_eq!(conversion.provenance.len(), conversion.automaton.num_states());
    }

    #[test]
    fn minimization_preserves_language((dfa, symbols) in arb_dfa(), words in arb_words()) {
        let min = minimize(&dfa, &EngineConfig::default()).unwrap();
        prop_assert_eq!(classify(&min), Kind::Dfa);
        prop_assert!(min.num_states() <= dfa.num_states());
        for raw in &words {
            let input = word(raw, symbols);
            prop_assert_eq!(
                simulate(&dfa, &input).unwrap().accepted,
                simulate(&min, &input).unwrap().accepted
            );
        }
    }

    #[test]
    fn minimization_is_minimal((dfa, _) in arb_dfa()) {
        let min = minimize(&dfa, &EngineConfig::default()).unwrap();
        prop_assert_eq!(min.num_states(), moore_class_count(&dfa));
    }

    #[test]
    fn minimization_is_idempotent((dfa, _) in arb_dfa()) {
        let config = EngineConfig::default();
        let once = minimize(&dfa, &config).unwrap();
        let twice = minimize(&once, &config).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn classifier_totality_law((nfa, _) in arb_nfa()) {
        let exactly_one = nfa
            .states()
            .all(|state| nfa.alphabet().all(|symbol| nfa.targets(state, symbol).len() == 1));
        prop_assert_eq!(classify(&nfa) == Kind::Dfa, exactly_one);
    }

    #[test]
    fn text_format_round_trips((nfa, _) in arb_nfa()) {
        let back: Automaton = nfa.to_string().parse().unwrap();
        prop_assert_eq!(back, nfa);
    }
}
