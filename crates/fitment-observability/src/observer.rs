//! Selector observer that writes structured logs.

use fitment_core::selector::{SelectorObserver, SelectorTrace};

use crate::logging::{LogLevel, StructuredLogger};

/// Logs every selector trace through a [`StructuredLogger`].
///
/// Selections and failures log at info/warn; fetch bookkeeping at debug.
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    logger: StructuredLogger,
}

impl LoggingObserver {
    pub fn new(logger: StructuredLogger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }
}

fn level_for(trace: &SelectorTrace) -> LogLevel {
    match trace {
        SelectorTrace::Selected { .. } | SelectorTrace::Cleared => LogLevel::Info,
        SelectorTrace::FetchFailed { .. } => LogLevel::Warn,
        SelectorTrace::FetchIssued { .. }
        | SelectorTrace::FetchApplied { .. }
        | SelectorTrace::StaleDiscarded { .. } => LogLevel::Debug,
    }
}

impl SelectorObserver for LoggingObserver {
    fn on_trace(&self, trace: &SelectorTrace) {
        let level = level_for(trace);
        if !self.logger.enabled(level) {
            return;
        }

        let mut entry = self.logger.builder(level, trace.name());
        if let Some(step) = trace.level() {
            entry = entry.field("step", step.as_str());
        }
        entry = match trace {
            SelectorTrace::Selected { option_id, .. } => entry.field("option", option_id.as_str()),
            SelectorTrace::Cleared => entry,
            SelectorTrace::FetchIssued { token, parent_id, .. } => {
                let entry = entry.field_u64("token", *token);
                match parent_id {
                    Some(parent) => entry.field("parent", parent.as_str()),
                    None => entry,
                }
            }
            SelectorTrace::FetchApplied { token, options, elapsed, .. } => entry
                .field_u64("token", *token)
                .field_u64("options", *options as u64)
                .duration_us("fetch_us", *elapsed),
            SelectorTrace::FetchFailed { token, reason, elapsed, .. } => entry
                .field_u64("token", *token)
                .field("reason", reason.as_str())
                .duration_us("fetch_us", *elapsed),
            SelectorTrace::StaleDiscarded { token, elapsed, .. } => entry
                .field_u64("token", *token)
                .duration_us("fetch_us", *elapsed),
        };
        entry.emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogSink;
    use fitment_core::vehicle::Level;
    use fitment_core::SessionId;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn test_logs_traces_above_min_level() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let logger = StructuredLogger::new(SessionId::new("s-1"))
            .with_min_level(LogLevel::Info)
            .with_sink(LogSink::Memory(Arc::clone(&entries)));
        let observer = LoggingObserver::new(logger);

        observer.on_trace(&SelectorTrace::FetchIssued {
            level: Level::Brand,
            token: 1,
            parent_id: None,
        });
        observer.on_trace(&SelectorTrace::Selected {
            level: Level::Brand,
            option_id: "bmw".into(),
        });
        observer.on_trace(&SelectorTrace::FetchFailed {
            level: Level::Model,
            token: 2,
            reason: "Transport error: reset".into(),
            elapsed: Duration::from_millis(5),
        });

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "selected");
        assert_eq!(entries[0].fields["option"], "bmw");
        assert_eq!(entries[1].level, LogLevel::Warn);
        assert_eq!(entries[1].fields["step"], "model");
        assert_eq!(entries[1].fields["fetch_us"], 5000);
    }
}
