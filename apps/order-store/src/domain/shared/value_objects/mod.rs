//! Shared Value Objects
//!
//! Immutable domain types used across the order store.
//! Value objects are compared by value, not identity.

mod identifiers;
mod money;
mod quantity;

pub use identifiers::{CustomerId, OrderId, OrderItemId, ProductId};
pub use money::Money;
pub use quantity::Quantity;
