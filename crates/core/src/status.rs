//! Code lifecycle status and state machine.
//!
//! The machine is intentionally small: `Planned` is the only initial state,
//! `Completed`, `Failed`, and `Stopped` are terminal, and the only way into
//! `Stopped` is an explicit cancel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`CodeRecord`](crate::record::CodeRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeStatus {
    /// Submitted, not yet started (initial state).
    Planned,
    /// The script is currently running on a worker.
    Executing,
    /// The script finished and its output classified as successful.
    Completed,
    /// The script raised an evaluation error or produced the overflow
    /// sentinel in its output.
    Failed,
    /// The run was cancelled before or during execution.
    Stopped,
}

impl CodeStatus {
    /// Returns the set of statuses reachable from `self`.
    ///
    /// Terminal states return an empty slice because no further transitions
    /// are allowed.
    pub fn valid_transitions(self) -> &'static [CodeStatus] {
        match self {
            // Planned -> Executing, Stopped
            CodeStatus::Planned => &[CodeStatus::Executing, CodeStatus::Stopped],
            // Executing -> Completed, Failed, Stopped
            CodeStatus::Executing => &[
                CodeStatus::Completed,
                CodeStatus::Failed,
                CodeStatus::Stopped,
            ],
            // Terminal states: Completed, Failed, Stopped
            CodeStatus::Completed | CodeStatus::Failed | CodeStatus::Stopped => &[],
        }
    }

    /// Check whether a transition from `self` to `to` is valid.
    pub fn can_transition(self, to: CodeStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid
    /// ones.
    pub fn validate_transition(self, to: CodeStatus) -> Result<(), String> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(format!("Invalid transition: {self} -> {to}"))
        }
    }

    /// True for `Completed`, `Failed`, and `Stopped`.
    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodeStatus::Planned => "PLANNED",
            CodeStatus::Executing => "EXECUTING",
            CodeStatus::Completed => "COMPLETED",
            CodeStatus::Failed => "FAILED",
            CodeStatus::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

impl FromStr for CodeStatus {
    type Err = String;

    /// Case-insensitive parse, used by the status-filter lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PLANNED" => Ok(CodeStatus::Planned),
            "EXECUTING" => Ok(CodeStatus::Executing),
            "COMPLETED" => Ok(CodeStatus::Completed),
            "FAILED" => Ok(CodeStatus::Failed),
            "STOPPED" => Ok(CodeStatus::Stopped),
            other => Err(format!("Unknown code status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
