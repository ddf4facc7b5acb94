//! Persistence Adapters
//!
//! Implementations of [`OrderRepository`](crate::domain::checkout::OrderRepository):
//! SQLite through `sqlx` for real storage, and an in-memory map for tests
//! and development.

mod error;
pub mod in_memory;
pub mod records;
pub mod sqlite;

pub use in_memory::InMemoryOrderRepository;
pub use records::{OrderItemRecord, OrderRecord};
pub use sqlite::SqliteOrderRepository;
