//! scaffold::logs
//!
//! Creator-style log capture.
//!
//! Backends report progress as prefixed lines (`Note: ...`, `Debug: ...`,
//! `Error: ...`). The lines are kept in insertion order for the
//! `X-Creator-Logs` header and the JSON error body, and are mirrored to
//! `tracing` so they also show up in the server log.

/// Ordered log lines captured during one backend call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBuffer {
    lines: Vec<String>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user-facing note.
    pub fn note(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!(target: "adt::scaffold", "{}", message);
        self.lines.push(format!("Note: {}", message));
    }

    /// Record a debug detail.
    pub fn debug(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::debug!(target: "adt::scaffold", "{}", message);
        self.lines.push(format!("Debug: {}", message));
    }

    /// Record an error.
    pub fn error(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::warn!(target: "adt::scaffold", "{}", message);
        self.lines.push(format!("Error: {}", message));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
