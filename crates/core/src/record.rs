//! The persisted code record entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::status::CodeStatus;
use crate::types::{CodeId, Timestamp};

/// One script submission with its status, captured output, and timing.
///
/// Mutated only by the execution engine and the cancellation path during its
/// active life; deleted only on explicit request from a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRecord {
    /// Unique identifier. Nil until the store assigns one on first save.
    pub id: CodeId,
    /// Current lifecycle status.
    pub status: CodeStatus,
    /// The script source as submitted.
    pub script_body: String,
    /// Ordered textual output the script produced. For a failed evaluation
    /// the diagnostic message is the terminal entry.
    pub outputs: Vec<String>,
    /// The instant the run was requested to start, if deferred.
    pub scheduled_at: Option<Timestamp>,
    /// Wall-clock execution time in milliseconds, set when the run finishes.
    pub execution_duration_ms: Option<u64>,
}

impl CodeRecord {
    /// Create a new record in the `Planned` state with an unassigned id.
    pub fn new(script_body: String, scheduled_at: Option<Timestamp>) -> Self {
        Self {
            id: Uuid::nil(),
            status: CodeStatus::Planned,
            script_body,
            outputs: Vec::new(),
            scheduled_at,
            execution_duration_ms: None,
        }
    }

    /// Move the record to `next`, enforcing the state machine edges.
    pub fn transition_to(&mut self, next: CodeStatus) -> Result<(), CoreError> {
        self.status
            .validate_transition(next)
            .map_err(CoreError::InvalidState)?;
        self.status = next;
        Ok(())
    }

    /// True once the record has reached `Completed`, `Failed`, or `Stopped`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
