use crate::error::StateError;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Lifecycle of a single validation run.
///
/// ```text
/// Initialized -> RunningIntegrity -> RunningPerformance -> Assembled
/// Initialized -> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Initialized,
    RunningIntegrity,
    RunningPerformance,
    Assembled,
    Aborted,
}

impl RunState {
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Initialized, RunningIntegrity)
                | (Initialized, Aborted)
                | (RunningIntegrity, RunningPerformance)
                | (RunningPerformance, Assembled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Assembled | RunState::Aborted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Initialized => "initialized",
            RunState::RunningIntegrity => "running_integrity",
            RunState::RunningPerformance => "running_performance",
            RunState::Assembled => "assembled",
            RunState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Guards the run lifecycle; every phase change goes through `advance`.
#[derive(Debug)]
pub struct RunStateMachine {
    state: RunState,
    history: Vec<RunState>,
}

impl RunStateMachine {
    pub fn new() -> Self {
        RunStateMachine {
            state: RunState::Initialized,
            history: vec![RunState::Initialized],
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    pub fn advance(&mut self, next: RunState) -> Result<(), StateError> {
        if !self.state.can_transition_to(next) {
            return Err(StateError {
                from: self.state,
                to: next,
            });
        }
        debug!(from = %self.state, to = %next, "Run state transition");
        self.state = next;
        self.history.push(next);
        Ok(())
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
