//! Shared Domain Types
//!
//! Value objects and errors shared across the domain layer.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::{CustomerId, Money, OrderId, OrderItemId, ProductId, Quantity};
