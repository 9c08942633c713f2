use crate::types::CodeId;

/// Domain-level error type shared across the workspace.
///
/// Lifecycle and lookup failures surface as distinct named kinds; evaluation
/// failures never appear here because the execution engine absorbs them into
/// a terminal `Failed` record.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No record (or live scheduled run) exists for the given id.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: CodeId },

    /// The operation is not permitted in the record's current lifecycle
    /// state, e.g. deleting an active record or double-submitting an id.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The record store failed. Propagated to the caller unmodified; the
    /// engine and scheduler never retry persistence.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl CoreError {
    /// Shorthand for a missing code record.
    pub fn record_not_found(id: CodeId) -> Self {
        Self::NotFound {
            entity: "code record",
            id,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_entity_and_id() {
        let id = uuid::Uuid::new_v4();
        let err = CoreError::record_not_found(id);
        let msg = err.to_string();
        assert!(msg.contains("code record"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn invalid_state_carries_message() {
        let err = CoreError::InvalidState("already scheduled".to_string());
        assert_eq!(err.to_string(), "Invalid state: already scheduled");
    }

    #[test]
    fn persistence_carries_message() {
        let err = CoreError::Persistence("store unavailable".to_string());
        assert_eq!(err.to_string(), "Persistence failure: store unavailable");
    }
}
