//! Ordered output accumulator for a single run.

/// Collects the textual output a script produces, in program order.
///
/// Each run owns exactly one sink; the evaluator pushes every printed value
/// before its call returns, so the line order matches call order.
#[derive(Debug, Default)]
pub struct OutputSink {
    lines: Vec<String>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one produced value.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Number of lines captured so far.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consume the sink, yielding the captured lines in push order.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
