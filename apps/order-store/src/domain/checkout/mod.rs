//! Checkout Bounded Context
//!
//! Orders, their line items, and the persistence port that keeps stored
//! orders in sync with their in-memory aggregates.

pub mod aggregate;
pub mod errors;
pub mod repository;
pub mod services;

pub use aggregate::{Order, OrderItem};
pub use errors::{OrderError, RepositoryError};
pub use repository::OrderRepository;
pub use services::{ReconciliationPlan, ReconciliationStep};
