//! Observability module for logging and metrics.
//!
//! Structured logs go through `tracing`; repository counters and latency
//! histograms go through the `metrics` facade.

mod logging;
mod metrics;

pub use logging::{LoggingError, init_logging};
pub use metrics::{record_reconciliation, record_repository_operation};
