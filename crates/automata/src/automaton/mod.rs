//! The automaton model.
//!
//! This module provides the validated [`Automaton`] value type with:
//! - Name interning for states and symbols (declaration order is preserved)
//! - Bit-set state sets for the powerset-style algorithms
//! - Indexed forward and reverse transitions
//! - The textual exchange format (`FromStr` / `Display`)

mod model;
mod state;
mod symbol;
mod text;

pub use model::{Automaton, AutomatonBuilder};
pub use state::{StateId, StateSet};
pub use symbol::{NameTable, SymbolId};
