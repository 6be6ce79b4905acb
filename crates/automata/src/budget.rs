//! Runtime enforcement of [`Limits`].
//!
//! A [`Budget`] is started at the beginning of an operation. The operation charges it for
//! every state it creates and checks it at loop boundaries (once per dequeued subset or
//! splitter block); nothing is interrupted mid-step.

use crate::config::Limits;
use crate::error::{Error, LimitKind, Result};
use std::time::{Duration, Instant};

/// Work accounting for one engine operation.
#[derive(Debug, Clone)]
pub struct Budget {
    max_states: Option<usize>,
    deadline: Option<Duration>,
    started: Instant,
    states: usize,
}

impl Budget {
    /// Start the clock for an operation bounded by `limits`.
    pub fn new(limits: &Limits) -> Self {
        Self {
            max_states: limits.max_states,
            deadline: limits.deadline,
            started: Instant::now(),
            states: 0,
        }
    }

    /// A budget that never runs out.
    pub fn unlimited() -> Self {
        Self::new(&Limits::unlimited())
    }

    /// Account for one newly created state.
    pub fn charge_state(&mut self) -> Result<()> {
        self.states += 1;
        match self.max_states {
            Some(limit) if self.states > limit => Err(exceeded(LimitKind::States { limit })),
            _ => Ok(()),
        }
    }

    /// Fail once the wall-clock budget is spent. A zero deadline is always spent.
    pub fn check(&self) -> Result<()> {
        match self.deadline {
            Some(limit) if self.started.elapsed() >= limit => {
                Err(exceeded(LimitKind::Deadline { limit }))
            }
            _ => Ok(()),
        }
    }

    /// States charged so far.
    pub fn states(&self) -> usize {
        self.states
    }
}

fn exceeded(kind: LimitKind) -> Error {
    tracing::warn!(%kind, "work budget exceeded");
    Error::SizeLimitExceeded(kind)
}
