//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the domain layer. Following
//! hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**
//!   - `persistence/`: Order repository adapters (SQLite, in-memory)

pub mod persistence;
