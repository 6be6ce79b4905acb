//! The line-oriented text format automata are exchanged in.
//!
//! ```text
//! States: q0,q1,q2
//! Alphabet: 0,1
//! Transitions:
//! q0,0,q1
//! q1,1,q2
//! Start: q0
//! Final: q2
//! ```
//!
//! Section names are matched case-insensitively, blank lines are ignored and every name is
//! trimmed. `Final:` may be left empty; every other section is required.

use crate::automaton::model::{Automaton, AutomatonBuilder};
use crate::error::{Error, StructureError};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    States,
    Alphabet,
    Transitions,
    Start,
    Final,
}

impl Section {
    const ALL: [Section; 5] = [
        Section::States,
        Section::Alphabet,
        Section::Transitions,
        Section::Start,
        Section::Final,
    ];

    fn header(self) -> &'static str {
        match self {
            Section::States => "States",
            Section::Alphabet => "Alphabet",
            Section::Transitions => "Transitions",
            Section::Start => "Start",
            Section::Final => "Final",
        }
    }

    fn from_header(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.header().eq_ignore_ascii_case(key.trim()))
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn malformed(line: usize, content: &str) -> Error {
    StructureError::MalformedLine {
        line,
        content: content.to_string(),
    }
    .into()
}

impl FromStr for Automaton {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut builder = AutomatonBuilder::new();
        let mut seen: Vec<Section> = Vec::with_capacity(Section::ALL.len());
        let mut in_transitions = false;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let header = line
                .split_once(':')
                .and_then(|(key, value)| Section::from_header(key).map(|s| (s, value.trim())));

            let Some((section, value)) = header else {
                if !in_transitions {
                    return Err(malformed(line_no, line));
                }
                let parts: Vec<&str> = line.split(',').map(str::trim).collect();
                match parts.as_slice() {
                    [from, symbol, to] if !from.is_empty() && !symbol.is_empty() && !to.is_empty() => {
                        builder.add_transition(*from, *symbol, *to);
                    }
                    _ => return Err(malformed(line_no, line)),
                }
                continue;
            };

            if seen.contains(&section) {
                return Err(malformed(line_no, line));
            }
            seen.push(section);
            in_transitions = section == Section::Transitions;

            match section {
                Section::States => {
                    for state in split_list(value) {
                        builder.add_state(state);
                    }
                }
                Section::Alphabet => {
                    for symbol in split_list(value) {
                        builder.add_symbol(symbol);
                    }
                }
                Section::Transitions if !value.is_empty() => {
                    return Err(malformed(line_no, line));
                }
                Section::Transitions => {}
                Section::Start => {
                    let mut names = split_list(value);
                    match (names.next(), names.next()) {
                        (Some(start), None) => {
                            builder.set_start_state(start);
                        }
                        _ => return Err(malformed(line_no, line)),
                    }
                }
                Section::Final => {
                    for state in split_list(value) {
                        builder.add_final_state(state);
                    }
                }
            }
        }

        if let Some(missing) = Section::ALL.into_iter().find(|s| !seen.contains(s)) {
            return Err(StructureError::MissingSection(missing.header()).into());
        }

        builder.build()
    }
}

/// Renders the text format. Building rejects names the format cannot carry, so the output
/// always parses back into an equal automaton.
impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "States: {}", self.states().collect::<Vec<_>>().join(","))?;
        writeln!(f, "Alphabet: {}", self.alphabet().collect::<Vec<_>>().join(","))?;
        writeln!(f, "Transitions:")?;
        for (from, symbol, to) in self.transitions() {
            writeln!(f, "{from},{symbol},{to}")?;
        }
        writeln!(f, "Start: {}", self.start_state())?;
        write!(f, "Final: {}", self.final_states().collect::<Vec<_>>().join(","))
    }
}
