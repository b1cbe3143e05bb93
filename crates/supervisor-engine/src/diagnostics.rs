//! # supervisor-engine::diagnostics
//!
//! Per spec §9 ("diagnostics to stderr are acceptable; route through a
//! pluggable sink so tests can capture them"), this module is the Rust
//! expression of the original's scattered `fprintf(stderr, "Error: %s(): ...",
//! __FUNCTION__)` calls. The public API (`api.rs`) logs through a
//! `DiagnosticSink` instead of writing directly to stderr, and also emits a
//! `tracing` event at the same call site for structured log consumers.

use std::sync::Mutex;

/// A single diagnostic emitted by a validation or dispatch failure. Mirrors
/// spec §7's "`Error: <function>()`" line format: `function` is the public
/// API entry point, `message` is the human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub function: &'static str,
    pub message: String,
}

/// Where the engine's diagnostics go. `StderrSink` is the default,
/// production behavior; `CapturingSink` lets tests assert on exactly which
/// diagnostics were emitted without scraping stderr.
pub trait DiagnosticSink: Send {
    fn emit(&self, diag: &Diagnostic);
}

/// Writes `Error: <function>(): <message>` to stderr, matching the
/// original's reporting format.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, diag: &Diagnostic) {
        eprintln!("Error: {}(): {}", diag.function, diag.message);
    }
}

/// Accumulates diagnostics in memory instead of printing them.
#[derive(Default)]
pub struct CapturingSink {
    captured: Mutex<Vec<Diagnostic>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything captured so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.captured.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.captured.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CapturingSink {
    fn emit(&self, diag: &Diagnostic) {
        self.captured.lock().unwrap().push(diag.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capturing_sink_records_in_order() {
        let sink = CapturingSink::new();
        sink.emit(&Diagnostic { function: "wb_supervisor_field_set_sf_float", message: "value is NaN".into() });
        sink.emit(&Diagnostic { function: "wb_supervisor_node_remove", message: "protected node type".into() });
        let all = sink.diagnostics();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].function, "wb_supervisor_field_set_sf_float");
        assert_eq!(all[1].function, "wb_supervisor_node_remove");
    }
}
