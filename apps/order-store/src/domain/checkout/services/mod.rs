//! Checkout domain services.

pub mod reconciliation;

pub use reconciliation::{ReconciliationPlan, ReconciliationStep};
