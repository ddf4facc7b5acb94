//! Metrics for the order store.
//!
//! Emitted through the `metrics` facade. Nothing is recorded until the host
//! process installs a recorder.
//!
//! # Example
//!
//! ```ignore
//! use order_store::observability::record_repository_operation;
//! use std::time::Instant;
//!
//! let started = Instant::now();
//! let result = repo.update(&order).await;
//! record_repository_operation("sqlite", "update", &result, started.elapsed());
//! ```

use std::time::Duration;

use metrics::{counter, histogram};

use crate::domain::checkout::{ReconciliationPlan, RepositoryError};

/// Record the outcome and latency of one repository call.
///
/// # Arguments
///
/// * `backend` - Adapter name (e.g., "sqlite", "in_memory")
/// * `operation` - Port method name (e.g., "create", "update")
/// * `result` - Call result; errors are labelled by [`RepositoryError::kind`]
/// * `elapsed` - Wall time spent in the call
pub fn record_repository_operation<T>(
    backend: &'static str,
    operation: &'static str,
    result: &Result<T, RepositoryError>,
    elapsed: Duration,
) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(err) => err.kind(),
    };

    counter!(
        "order_store_operations_total",
        "backend" => backend,
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        "order_store_operation_duration_seconds",
        "backend" => backend,
        "operation" => operation
    )
    .record(elapsed.as_secs_f64());
}

/// Count the item-level writes of a reconciliation plan by kind.
pub fn record_reconciliation(plan: &ReconciliationPlan) {
    for step in plan.steps() {
        counter!("order_store_reconciled_items_total", "kind" => step.kind()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Without an installed recorder these are no-ops; they must not panic.
    #[test]
    fn record_without_recorder() {
        let ok: Result<(), RepositoryError> = Ok(());
        record_repository_operation("in_memory", "find", &ok, Duration::from_millis(3));

        let err: Result<(), RepositoryError> = Err(RepositoryError::not_found("o1"));
        record_repository_operation("in_memory", "find", &err, Duration::ZERO);

        record_reconciliation(&ReconciliationPlan::default());
    }
}
