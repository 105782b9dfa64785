//! Cooperative wall-clock budget for a single evaluation.
//!
//! The clock is polled between steps (every parser step and every node the
//! evaluator visits); nothing is preempted.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// The step an expression belongs to, used to pick a time budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRef {
    pub name: String,
    /// Executor kind (`loop`, `condition`, `transform`, ...), if known
    pub kind: Option<String>,
}

impl StepRef {
    pub fn new(name: impl Into<String>) -> Self {
        StepRef {
            name: name.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Supplies the time budget for an evaluation.
pub trait TimeoutPolicy: Send + Sync {
    fn timeout_for(&self, step: Option<&StepRef>) -> Duration;
}

/// Same budget for every step.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeout(pub Duration);

impl Default for FixedTimeout {
    fn default() -> Self {
        FixedTimeout(DEFAULT_TIMEOUT)
    }
}

impl TimeoutPolicy for FixedTimeout {
    fn timeout_for(&self, _step: Option<&StepRef>) -> Duration {
        self.0
    }
}

/// Per-step overrides, then per-kind overrides, then a default.
#[derive(Debug, Clone, Default)]
pub struct StepTimeouts {
    default: FixedTimeout,
    by_step: HashMap<String, Duration>,
    by_kind: HashMap<String, Duration>,
}

impl StepTimeouts {
    pub fn new(default: Duration) -> Self {
        StepTimeouts {
            default: FixedTimeout(default),
            ..Default::default()
        }
    }

    pub fn step(mut self, name: impl Into<String>, timeout: Duration) -> Self {
        self.by_step.insert(name.into(), timeout);
        self
    }

    pub fn kind(mut self, kind: impl Into<String>, timeout: Duration) -> Self {
        self.by_kind.insert(kind.into(), timeout);
        self
    }
}

impl TimeoutPolicy for StepTimeouts {
    fn timeout_for(&self, step: Option<&StepRef>) -> Duration {
        let Some(step) = step else {
            return self.default.0;
        };
        self.by_step
            .get(&step.name)
            .or_else(|| step.kind.as_ref().and_then(|k| self.by_kind.get(k)))
            .copied()
            .unwrap_or(self.default.0)
    }
}

/// Evaluation ran past its budget.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "expression evaluation timed out after {}ms (limit {}ms): {expression}",
    .elapsed.as_millis(),
    .limit.as_millis()
)]
pub struct TimeoutError {
    pub expression: String,
    pub elapsed: Duration,
    pub limit: Duration,
}

/// Start time and budget of one top-level evaluation.
#[derive(Debug, Clone)]
pub struct Deadline {
    expression: String,
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn start(expression: &str, budget: Duration) -> Self {
        Deadline {
            expression: expression.to_string(),
            start: Instant::now(),
            budget,
        }
    }

    /// No practical limit, for parsing outside an evaluation.
    pub fn unbounded() -> Self {
        Deadline::start("", Duration::MAX)
    }

    pub fn check(&self) -> Result<(), TimeoutError> {
        check_timeout(self.start, self.budget).map_err(|elapsed| TimeoutError {
            expression: self.expression.clone(),
            elapsed,
            limit: self.budget,
        })
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Compare elapsed time against `budget`; the error carries the elapsed
/// time. A zero budget always fails.
pub fn check_timeout(start: Instant, budget: Duration) -> Result<(), Duration> {
    let elapsed = start.elapsed();
    if elapsed >= budget {
        Err(elapsed)
    } else {
        Ok(())
    }
}
