//! The script evaluation port.

use jsrun_core::OutputSink;
use tokio_util::sync::CancellationToken;

/// A typed evaluation failure reported by the interpreter.
///
/// Carries the diagnostic text the interpreter produced (e.g.
/// `"X is not defined"`). The execution engine records it as the terminal
/// output entry of the failed run; it is never surfaced to callers.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct EvaluationError {
    message: String,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Boundary to the embedded script interpreter.
///
/// Implementations evaluate `script` synchronously, pushing each produced
/// value to `sink` in program order before returning. The engine invokes
/// `evaluate` on a blocking worker, so implementations may block freely.
///
/// Cancellation is cooperative: implementations should poll `cancel` at safe
/// points and return early once it trips. A script spinning in a
/// non-yielding loop cannot be force-stopped; that limitation belongs to the
/// interpreter, not this core.
pub trait ScriptEvaluator: Send + Sync {
    fn evaluate(
        &self,
        script: &str,
        sink: &mut OutputSink,
        cancel: &CancellationToken,
    ) -> Result<(), EvaluationError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
