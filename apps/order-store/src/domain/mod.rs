//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: `Order` and its `OrderItem`s
//! - **Value Objects**: identifiers, money and quantities
//! - **Domain Services**: item reconciliation planning
//! - **Repository Traits**: Persistence abstractions (implemented in adapters)
//!
//! # Bounded Contexts
//!
//! - [`checkout`]: Orders, line items and their persistence port

pub mod checkout;
pub mod shared;
