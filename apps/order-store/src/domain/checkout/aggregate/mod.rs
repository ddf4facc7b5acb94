//! Order Aggregate
//!
//! The Order aggregate owns its line items and derives its total from them.

mod order;
mod order_item;

pub use order::Order;
pub use order_item::OrderItem;
