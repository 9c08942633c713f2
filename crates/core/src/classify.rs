//! Post-run result classification.

use crate::status::CodeStatus;

/// Output entry treated as an arithmetic-overflow marker.
///
/// Some interpreters report numeric overflow by printing `Infinity` instead
/// of raising an error, so a run that produced this value is not considered
/// successful even when the evaluator returned normally.
pub const OVERFLOW_SENTINEL: &str = "Infinity";

/// Classify a run that returned normally from the evaluator.
///
/// Returns [`CodeStatus::Failed`] if any captured output line equals
/// [`OVERFLOW_SENTINEL`], otherwise [`CodeStatus::Completed`].
///
/// This is a documented heuristic, not exhaustive failure detection: the
/// match is exact element equality, and its scope is deliberately not
/// broadened to substrings or other sentinel values.
pub fn classify_outputs(outputs: &[String]) -> CodeStatus {
    if outputs.iter().any(|line| line == OVERFLOW_SENTINEL) {
        CodeStatus::Failed
    } else {
        CodeStatus::Completed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
