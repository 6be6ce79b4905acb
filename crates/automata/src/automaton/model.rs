//! The validated automaton value type.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{NameTable, SymbolId};
use crate::error::{Error, Result, StructureError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// A finite automaton, deterministic or not.
///
/// Construction validates every structural invariant, so every method here and every engine
/// operation can assume the automaton is sound. An `Automaton` is never mutated after it is
/// built; conversion and minimization return new automata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AutomatonBuilder", into = "AutomatonBuilder")]
pub struct Automaton {
    states: NameTable,
    alphabet: NameTable,
    start_state: StateId,
    final_states: StateSet,
    /// Transitions: (source, symbol) -> set of destinations
    transitions: HashMap<(StateId, SymbolId), StateSet>,
    /// Reverse transitions: (destination, symbol) -> set of sources
    reverse_transitions: HashMap<(StateId, SymbolId), StateSet>,
}

impl Automaton {
    /// Validate and build an automaton from borrowed names.
    ///
    /// ```
    /// use automata::Automaton;
    ///
    /// let dfa = Automaton::build(
    ///     ["even", "odd"],
    ///     ["1"],
    ///     [("even", "1", "odd"), ("odd", "1", "even")],
    ///     "even",
    ///     ["even"],
    /// )
    /// .unwrap();
    /// assert_eq!(dfa.num_states(), 2);
    /// ```
    pub fn build<'a>(
        states: impl IntoIterator<Item = &'a str>,
        alphabet: impl IntoIterator<Item = &'a str>,
        transitions: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>,
        start: &str,
        finals: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let mut builder = AutomatonBuilder::new();
        for state in states {
            builder.add_state(state);
        }
        for symbol in alphabet {
            builder.add_symbol(symbol);
        }
        for (from, symbol, to) in transitions {
            builder.add_transition(from, symbol, to);
        }
        builder.set_start_state(start);
        for state in finals {
            builder.add_final_state(state);
        }
        builder.build()
    }

    /// Assemble an automaton from ids that are already known to be consistent.
    ///
    /// Only the engine's own constructions (subset construction, minimization) come through
    /// here; they derive every id from tables they built themselves.
    pub(crate) fn from_parts(
        states: NameTable,
        alphabet: NameTable,
        start_state: StateId,
        final_states: StateSet,
        edges: impl IntoIterator<Item = (StateId, SymbolId, StateId)>,
    ) -> Self {
        debug_assert!((start_state as usize) < states.len());
        debug_assert!(final_states.iter().all(|s| (s as usize) < states.len()));

        let num_states = states.len();
        let mut transitions: HashMap<(StateId, SymbolId), StateSet> = HashMap::new();
        let mut reverse_transitions: HashMap<(StateId, SymbolId), StateSet> = HashMap::new();
        for (source, symbol, destination) in edges {
            debug_assert!((symbol as usize) < alphabet.len());
            transitions
                .entry((source, symbol))
                .or_insert_with(|| StateSet::with_capacity(num_states))
                .insert(destination);
            reverse_transitions
                .entry((destination, symbol))
                .or_insert_with(|| StateSet::with_capacity(num_states))
                .insert(source);
        }

        Self {
            states,
            alphabet,
            start_state,
            final_states,
            transitions,
            reverse_transitions,
        }
    }

    /// Get the number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Get the number of alphabet symbols.
    pub fn num_symbols(&self) -> usize {
        self.alphabet.len()
    }

    /// State names, in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.iter()
    }

    /// Alphabet symbols, in declaration order.
    pub fn alphabet(&self) -> impl Iterator<Item = &str> + '_ {
        self.alphabet.iter()
    }

    /// Name of the start state.
    pub fn start_state(&self) -> &str {
        self.state_name(self.start_state)
    }

    /// Final state names, in declaration order.
    pub fn final_states(&self) -> impl Iterator<Item = &str> + '_ {
        self.final_states.iter().map(|id| self.state_name(id))
    }

    /// Check if a state is accepting. Unknown names are not.
    pub fn is_final(&self, state: &str) -> bool {
        self.state_id(state)
            .is_some_and(|id| self.final_states.contains(id))
    }

    /// Check if a state with this name is declared.
    pub fn contains_state(&self, state: &str) -> bool {
        self.state_id(state).is_some()
    }

    /// Check if a symbol belongs to the alphabet.
    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbol_id(symbol).is_some()
    }

    /// Targets of `state` on `symbol`, in declaration order. Empty for unknown names.
    pub fn targets(&self, state: &str, symbol: &str) -> Vec<&str> {
        let (Some(state), Some(symbol)) = (self.state_id(state), self.symbol_id(symbol)) else {
            return Vec::new();
        };
        self.targets_of(state, symbol)
            .map(|set| self.names_of(set))
            .unwrap_or_default()
    }

    /// All transitions as `(from, symbol, to)` triples.
    ///
    /// Ordered by source state, then symbol, then destination, each in declaration order, so
    /// the listing is identical for identical automata.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str, &str)> + '_ {
        self.state_ids().flat_map(move |source| {
            self.symbol_ids().flat_map(move |symbol| {
                self.targets_of(source, symbol)
                    .into_iter()
                    .flat_map(|set| set.iter())
                    .map(move |destination| {
                        (
                            self.state_name(source),
                            self.symbol_name(symbol),
                            self.state_name(destination),
                        )
                    })
            })
        })
    }

    /// Number of `(from, symbol, to)` transitions.
    pub fn num_transitions(&self) -> usize {
        self.transitions.values().map(StateSet::len).sum()
    }

    /// Convert to a nested map representation: state -> symbol -> targets.
    ///
    /// Only pairs with at least one target appear.
    pub fn transition_map(&self) -> IndexMap<String, IndexMap<String, Vec<String>>> {
        let mut map: IndexMap<String, IndexMap<String, Vec<String>>> = IndexMap::new();

        for (src, sym, dst) in self.transitions() {
            map.entry(src.to_string())
                .or_default()
                .entry(sym.to_string())
                .or_default()
                .push(dst.to_string());
        }

        map
    }

    /// Names of every state reachable from the start state, in declaration order.
    pub fn reachable_states(&self) -> Vec<&str> {
        self.names_of(&self.reachable_set())
    }

    /// Check if the automaton accepts no strings at all.
    pub fn is_language_empty(&self) -> bool {
        !self.reachable_set().intersects(&self.final_states)
    }

    pub(crate) fn state_id(&self, name: &str) -> Option<StateId> {
        self.states.id(name)
    }

    pub(crate) fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.alphabet.id(name)
    }

    /// Name of a state id produced by this automaton.
    pub(crate) fn state_name(&self, id: StateId) -> &str {
        self.states.name(id).unwrap_or_default()
    }

    /// Name of a symbol id produced by this automaton.
    pub(crate) fn symbol_name(&self, id: SymbolId) -> &str {
        self.alphabet.name(id).unwrap_or_default()
    }

    pub(crate) fn state_ids(&self) -> impl Iterator<Item = StateId> + 'static {
        0..self.states.len() as StateId
    }

    pub(crate) fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> + 'static {
        0..self.alphabet.len() as SymbolId
    }

    pub(crate) fn start_id(&self) -> StateId {
        self.start_state
    }

    pub(crate) fn final_set(&self) -> &StateSet {
        &self.final_states
    }

    pub(crate) fn alphabet_table(&self) -> &NameTable {
        &self.alphabet
    }

    /// Get the destinations of a state on a symbol.
    pub(crate) fn targets_of(&self, source: StateId, symbol: SymbolId) -> Option<&StateSet> {
        self.transitions
            .get(&(source, symbol))
            .filter(|set| !set.is_empty())
    }

    /// Get the states that move into `destination` on `symbol`.
    pub(crate) fn sources_of(&self, destination: StateId, symbol: SymbolId) -> Option<&StateSet> {
        self.reverse_transitions.get(&(destination, symbol))
    }

    pub(crate) fn empty_set(&self) -> StateSet {
        StateSet::with_capacity(self.states.len())
    }

    /// Get the states reachable from a set of states on a given symbol.
    pub(crate) fn move_on_symbol(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        let mut reached = self.empty_set();

        for state in states.iter() {
            if let Some(destinations) = self.targets_of(state, symbol) {
                reached.union_with(destinations);
            }
        }

        reached
    }

    /// Find all states that move into `targets` on `symbol`.
    pub(crate) fn predecessors(&self, targets: &StateSet, symbol: SymbolId) -> StateSet {
        let mut predecessors = self.empty_set();

        for target in targets.iter() {
            if let Some(sources) = self.sources_of(target, symbol) {
                predecessors.union_with(sources);
            }
        }

        predecessors
    }

    /// Find all states reachable from the start state.
    pub(crate) fn reachable_set(&self) -> StateSet {
        let mut reachable = self.empty_set();
        let mut queue = VecDeque::from([self.start_state]);

        while let Some(state) = queue.pop_front() {
            if !reachable.insert(state) {
                continue;
            }

            for symbol in self.symbol_ids() {
                if let Some(next) = self.targets_of(state, symbol) {
                    queue.extend(next.iter().filter(|s| !reachable.contains(*s)));
                }
            }
        }

        reachable
    }

    pub(crate) fn names_of(&self, set: &StateSet) -> Vec<&str> {
        set.iter().map(|id| self.state_name(id)).collect()
    }
}

/// Incrementally collects an automaton definition by name and validates it in [`build`].
///
/// This is also the serialized shape of an [`Automaton`].
///
/// [`build`]: AutomatonBuilder::build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonBuilder {
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub alphabet: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<(String, String, String)>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub finals: Vec<String>,
}

impl AutomatonBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state.
    pub fn add_state(&mut self, name: impl Into<String>) -> &mut Self {
        self.states.push(name.into());
        self
    }

    /// Declare an alphabet symbol.
    pub fn add_symbol(&mut self, symbol: impl Into<String>) -> &mut Self {
        self.alphabet.push(symbol.into());
        self
    }

    /// Add a transition from one state to another on a symbol.
    pub fn add_transition(
        &mut self,
        from: impl Into<String>,
        symbol: impl Into<String>,
        to: impl Into<String>,
    ) -> &mut Self {
        self.transitions.push((from.into(), symbol.into(), to.into()));
        self
    }

    /// Set the start state, replacing any earlier one.
    pub fn set_start_state(&mut self, name: impl Into<String>) -> &mut Self {
        self.start = Some(name.into());
        self
    }

    /// Mark a state as accepting.
    pub fn add_final_state(&mut self, name: impl Into<String>) -> &mut Self {
        self.finals.push(name.into());
        self
    }

    /// Validate the collected definition.
    ///
    /// Duplicate final states and duplicate transitions collapse; duplicate state or symbol
    /// declarations are rejected because they make names ambiguous.
    pub fn build(&self) -> Result<Automaton> {
        if self.states.is_empty() {
            return Err(StructureError::NoStates.into());
        }
        if self.alphabet.is_empty() {
            return Err(StructureError::EmptyAlphabet.into());
        }

        let mut states = NameTable::new();
        for name in &self.states {
            check_name(name)?;
            if states.insert(name.as_str()).is_none() {
                return Err(StructureError::DuplicateState(name.clone()).into());
            }
        }

        let mut alphabet = NameTable::new();
        for symbol in &self.alphabet {
            check_name(symbol)?;
            if alphabet.insert(symbol.as_str()).is_none() {
                return Err(StructureError::DuplicateSymbol(symbol.clone()).into());
            }
        }

        let start = self.start.as_deref().ok_or(StructureError::MissingStartState)?;
        let start_state = states
            .id(start)
            .ok_or_else(|| StructureError::UnknownStartState(start.to_string()))?;

        let mut final_states = StateSet::with_capacity(states.len());
        for name in &self.finals {
            let id = states
                .id(name)
                .ok_or_else(|| StructureError::UnknownFinalState(name.clone()))?;
            final_states.insert(id);
        }

        let mut edges = Vec::with_capacity(self.transitions.len());
        for (from, symbol, to) in &self.transitions {
            let unknown_state = |state: &str| -> Error {
                StructureError::UnknownTransitionState {
                    from: from.clone(),
                    symbol: symbol.clone(),
                    to: to.clone(),
                    state: state.to_string(),
                }
                .into()
            };
            let source = states.id(from).ok_or_else(|| unknown_state(from.as_str()))?;
            let destination = states.id(to).ok_or_else(|| unknown_state(to.as_str()))?;
            let symbol_id =
                alphabet
                    .id(symbol)
                    .ok_or_else(|| StructureError::UnknownTransitionSymbol {
                        from: from.clone(),
                        symbol: symbol.clone(),
                        to: to.clone(),
                    })?;
            edges.push((source, symbol_id, destination));
        }

        let automaton = Automaton::from_parts(states, alphabet, start_state, final_states, edges);
        tracing::debug!(
            states = automaton.num_states(),
            symbols = automaton.num_symbols(),
            transitions = automaton.num_transitions(),
            "built automaton"
        );
        Ok(automaton)
    }
}

/// Reject names the text format would split, trim or misread as a section header.
fn check_name(name: &str) -> Result<(), StructureError> {
    if name.is_empty() {
        return Err(StructureError::EmptyName);
    }
    if name.trim() != name || name.contains([',', ':']) || name.chars().any(char::is_control) {
        return Err(StructureError::UnrepresentableName(name.to_string()));
    }
    Ok(())
}

impl TryFrom<AutomatonBuilder> for Automaton {
    type Error = Error;

    fn try_from(builder: AutomatonBuilder) -> Result<Self> {
        builder.build()
    }
}

impl From<Automaton> for AutomatonBuilder {
    fn from(automaton: Automaton) -> Self {
        Self {
            states: automaton.states().map(str::to_string).collect(),
            alphabet: automaton.alphabet().map(str::to_string).collect(),
            transitions: automaton
                .transitions()
                .map(|(from, symbol, to)| (from.to_string(), symbol.to_string(), to.to_string()))
                .collect(),
            start: Some(automaton.start_state().to_string()),
            finals: automaton.final_states().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_state_dfa() -> Automaton {
        Automaton::build(
            ["q0", "q1", "q2"],
            ["0", "1"],
            [
                ("q0", "0", "q1"),
                ("q0", "1", "q0"),
                ("q1", "0", "q2"),
                ("q1", "1", "q0"),
                ("q2", "0", "q2"),
                ("q2", "1", "q2"),
            ],
            "q0",
            ["q2"],
        )
        .unwrap()
    }

    const NO_EDGES: [(&str, &str, &str); 0] = [];

    fn structure_error(result: Result<Automaton>) -> StructureError {
        match result {
            Err(Error::InvalidAutomatonStructure(err)) => err,
            other => panic!("expected a structure error, got {other:?}"),
        }
    }

    #[test]
    fn test_build_basic() {
        let dfa = three_state_dfa();
        assert_eq!(dfa.num_states(), 3);
        assert_eq!(dfa.num_symbols(), 2);
        assert_eq!(dfa.num_transitions(), 6);
        assert_eq!(dfa.start_state(), "q0");
        assert_eq!(dfa.final_states().collect::<Vec<_>>(), vec!["q2"]);
        assert!(dfa.is_final("q2"));
        assert!(!dfa.is_final("q0"));
        assert!(!dfa.is_final("nope"));
        assert_eq!(dfa.targets("q1", "0"), vec!["q2"]);
        assert!(dfa.targets("q1", "7").is_empty());
    }

    #[test]
    fn test_rejects_bad_structure() {
        let empty: [&str; 0] = [];
        assert_eq!(
            structure_error(Automaton::build(empty, ["a"], NO_EDGES, "q0", empty)),
            StructureError::NoStates
        );
        assert_eq!(
            structure_error(Automaton::build(["q0"], empty, NO_EDGES, "q0", empty)),
            StructureError::EmptyAlphabet
        );
        assert_eq!(
            structure_error(Automaton::build(["q0"], ["a"], NO_EDGES, "q1", empty)),
            StructureError::UnknownStartState("q1".to_string())
        );
        assert_eq!(
            structure_error(Automaton::build(["q0"], ["a"], NO_EDGES, "q0", ["q3"])),
            StructureError::UnknownFinalState("q3".to_string())
        );
        assert_eq!(
            structure_error(Automaton::build(["q0", "q0"], ["a"], NO_EDGES, "q0", empty)),
            StructureError::DuplicateState("q0".to_string())
        );
        assert_eq!(
            structure_error(Automaton::build(["q0"], ["a", "a"], NO_EDGES, "q0", empty)),
            StructureError::DuplicateSymbol("a".to_string())
        );
        assert!(matches!(
            structure_error(Automaton::build(["q0"], ["a"], [("q0", "a", "q5")], "q0", empty)),
            StructureError::UnknownTransitionState { state, .. } if state == "q5"
        ));
        assert!(matches!(
            structure_error(Automaton::build(["q0"], ["a"], [("q0", "b", "q0")], "q0", empty)),
            StructureError::UnknownTransitionSymbol { .. }
        ));
        assert_eq!(
            structure_error(AutomatonBuilder::new().add_state("q0").add_symbol("a").build()),
            StructureError::MissingStartState
        );
    }

    #[test]
    fn test_rejects_names_the_text_format_cannot_hold() {
        let empty: [&str; 0] = [];
        for bad in ["a,b", " c", "d ", "Start:e", "f\ng"] {
            assert_eq!(
                structure_error(Automaton::build([bad], ["x"], NO_EDGES, bad, empty)),
                StructureError::UnrepresentableName(bad.to_string()),
                "state {bad:?}"
            );
            assert_eq!(
                structure_error(Automaton::build(["q0"], [bad], NO_EDGES, "q0", empty)),
                StructureError::UnrepresentableName(bad.to_string()),
                "symbol {bad:?}"
            );
        }
        assert_eq!(
            structure_error(Automaton::build([""], ["x"], NO_EDGES, "", empty)),
            StructureError::EmptyName
        );

        // Anything else the format can carry is accepted and prints back unchanged.
        let odd = Automaton::build(
            ["{a;b}'", "q 1", "∅"],
            ["0", "é"],
            [("{a;b}'", "é", "q 1"), ("q 1", "0", "∅")],
            "{a;b}'",
            ["∅"],
        )
        .unwrap();
        assert_eq!(odd.to_string().parse::<Automaton>().unwrap(), odd);
    }

    #[test]
    fn test_duplicates_collapse() {
        let nfa = Automaton::build(
            ["q0", "q1"],
            ["a"],
            [("q0", "a", "q1"), ("q0", "a", "q1")],
            "q0",
            ["q1", "q1"],
        )
        .unwrap();
        assert_eq!(nfa.num_transitions(), 1);
        assert_eq!(nfa.final_states().count(), 1);
    }

    #[test]
    fn test_transitions_are_ordered() {
        let nfa = Automaton::build(
            ["b", "a"],
            ["y", "x"],
            [("a", "x", "b"), ("b", "x", "a"), ("b", "y", "b"), ("b", "y", "a")],
            "b",
            ["a"],
        )
        .unwrap();
        assert_eq!(
            nfa.transitions().collect::<Vec<_>>(),
            vec![
                ("b", "y", "b"),
                ("b", "y", "a"),
                ("b", "x", "a"),
                ("a", "x", "b"),
            ]
        );

        let map = nfa.transition_map();
        assert_eq!(map["b"]["y"], vec!["b", "a"]);
        assert!(!map["a"].contains_key("y"));
    }

    #[test]
    fn test_reachability_and_emptiness() {
        let nfa = Automaton::build(
            ["q0", "q1", "island"],
            ["a"],
            [("q0", "a", "q1"), ("island", "a", "island")],
            "q0",
            ["island"],
        )
        .unwrap();
        assert_eq!(nfa.reachable_states(), vec!["q0", "q1"]);
        assert!(nfa.is_language_empty());
        assert!(!three_state_dfa().is_language_empty());
    }

    #[test]
    fn test_builder_round_trip() {
        let dfa = three_state_dfa();
        let builder = AutomatonBuilder::from(dfa.clone());
        assert_eq!(builder.build().unwrap(), dfa);
    }

    #[test]
    fn test_serde_validates() {
        let json = serde_json::to_string(&three_state_dfa()).unwrap();
        let back: Automaton = serde_json::from_str(&json).unwrap();
        assert_eq!(back, three_state_dfa());

        let bad = r#"{"states":["q0"],"alphabet":["a"],"transitions":[],"start":"q1","finals":[]}"#;
        assert!(serde_json::from_str::<Automaton>(bad).is_err());
    }
}
