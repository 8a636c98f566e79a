//! Observability for the vehicle selector.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with session context
//! - `LoggingObserver` - Logs every selector trace
//! - `MetricsObserver` - Fetch counters and latencies per level

mod logging;
mod metrics;
mod observer;

pub use logging::*;
pub use metrics::*;
pub use observer::*;

// Re-export SessionId from fitment-core for convenience
pub use fitment_core::SessionId;
