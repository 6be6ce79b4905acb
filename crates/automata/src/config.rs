//! Engine configuration.
//!
//! The engine reads no environment variables or files; the orchestration layer deserializes
//! an [`EngineConfig`] from wherever it keeps settings and passes it in.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for conversion and minimization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Work bounds
    pub limits: Limits,
    /// What subset construction does with `(state, symbol)` pairs that lead nowhere
    pub sink: SinkPolicy,
    /// Drop states unreachable from the start before minimizing
    pub prune_unreachable: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            sink: SinkPolicy::LeavePartial,
            prune_unreachable: true,
        }
    }
}

impl EngineConfig {
    /// Defaults with every bound switched off.
    pub fn unlimited() -> Self {
        Self {
            limits: Limits::unlimited(),
            ..Self::default()
        }
    }

    /// Replace the sink policy.
    pub fn with_sink(mut self, sink: SinkPolicy) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the work limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

/// Work bounds. `None` disables a bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of states an operation may create
    pub max_states: Option<usize>,
    /// Maximum number of states a branching automaton may have before subset construction
    /// is attempted at all
    pub max_source_states: Option<usize>,
    /// Wall-clock budget per operation
    #[serde(rename = "deadline_ms", with = "duration_ms")]
    pub deadline: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_states: Some(4096),
            max_source_states: Some(20),
            deadline: None,
        }
    }
}

impl Limits {
    /// No bound at all.
    pub fn unlimited() -> Self {
        Self {
            max_states: None,
            max_source_states: None,
            deadline: None,
        }
    }
}

/// How subset construction treats an empty target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkPolicy {
    /// Emit no transition, leaving the result partial.
    #[default]
    LeavePartial,
    /// Route every missing transition to one non-accepting sink state, making the result total.
    Synthesize,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => {
                s.serialize_some(&u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
            }
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
