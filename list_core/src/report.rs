//! Diagnostics sink for list parsing and materialization
//!
//! Every correction made while reading a list is reported with the field it
//! belongs to and the offending line. Lists never log directly.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Receives warnings produced while building or materializing a list
pub trait Reporter: Send + Sync {
    fn report(&self, field: &str, message: &str, line: &str);
}

/// Default sink: emits each report as a `tracing` warning
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, field: &str, message: &str, line: &str) {
        tracing::warn!(field, line, "{}", message);
    }
}

/// One recorded warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub field: String,
    pub message: String,
    pub line: String,
}

/// Sink that keeps every report in memory
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<Report>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the reports received so far
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, field: &str, message: &str, line: &str) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(Report {
                field: field.to_string(),
                message: message.to_string(),
                line: line.to_string(),
            });
        }
    }
}

/// The field a list belongs to, plus where its warnings go
#[derive(Clone)]
pub struct FieldContext {
    key: String,
    reporter: Arc<dyn Reporter>,
}

impl FieldContext {
    pub fn new(key: &str, reporter: Arc<dyn Reporter>) -> Self {
        FieldContext {
            key: key.to_string(),
            reporter,
        }
    }

    /// Context reporting through [`TracingReporter`]
    pub fn traced(key: &str) -> Self {
        Self::new(key, Arc::new(TracingReporter))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn warn(&self, message: &str, line: &str) {
        self.reporter.report(&self.key, message, line);
    }
}

impl fmt::Debug for FieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldContext")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
