//! Structured diagnostics for reflection degradations.
//!
//! Every unsupported or malformed schema shape degrades to a safe fallback
//! instead of raising; the degradation is reported through a [`DiagnosticsSink`]
//! so callers (and tests) can observe what was skipped. The default sink
//! forwards to `tracing`.

use std::sync::Mutex;

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    /// Expected degradation, e.g. a non-object leaf where a shape was probed.
    Debug,
    /// Degradation the caller likely wants to know about, e.g. a depth cap hit.
    Warn,
}

/// One reported degradation, tagged with the field path it occurred at.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// Dotted field path, empty for the projection root.
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warn(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn debug(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Debug,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Receiver for reflection diagnostics.
///
/// Implementations must be cheap and infallible; reporting a diagnostic can
/// never disturb the projection that emitted it.
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: routes diagnostics through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Warn => {
                tracing::warn!(path = %diagnostic.path, "{}", diagnostic.message);
            }
            DiagnosticLevel::Debug => {
                tracing::debug!(path = %diagnostic.path, "{}", diagnostic.message);
            }
        }
    }
}

/// In-memory sink for asserting on diagnostics in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.entries()
            .into_iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .collect()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(diagnostic);
        }
    }
}
