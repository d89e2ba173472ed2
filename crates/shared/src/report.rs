//! Audit-trail reporting
//!
//! Every user-visible event the importer emits (created X, skipped Y, dry-run
//! previews) goes through a [`Reporter`] so tests can assert on the emitted
//! events instead of parsing log output.

use std::sync::Mutex;

/// Severity of a reported event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Warn,
}

/// Sink for the importer's audit trail.
pub trait Reporter: Send + Sync {
    fn report(&self, level: ReportLevel, message: &str);

    fn info(&self, message: &str) {
        self.report(ReportLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(ReportLevel::Warn, message);
    }
}

/// Production reporter that forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Info => tracing::info!("{message}"),
            ReportLevel::Warn => tracing::warn!("{message}"),
        }
    }
}

/// In-memory reporter for tests.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<(ReportLevel, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events reported so far.
    pub fn events(&self) -> Vec<(ReportLevel, String)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// True if any event message contains the given fragment.
    pub fn contains(&self, fragment: &str) -> bool {
        self.events().iter().any(|(_, m)| m.contains(fragment))
    }

    /// Messages reported at warn level.
    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(level, _)| *level == ReportLevel::Warn)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_records_levels() {
        let reporter = MemoryReporter::new();
        reporter.info("created product");
        reporter.warn("unsupported charge model");

        assert_eq!(reporter.events().len(), 2);
        assert!(reporter.contains("created product"));
        assert_eq!(reporter.warnings(), vec!["unsupported charge model"]);
    }
}
