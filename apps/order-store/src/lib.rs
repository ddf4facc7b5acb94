// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Order Store - Rust Core Library
//!
//! Persistence for `Order` aggregates and their line items, with
//! identifier-keyed reconciliation of stored items against a desired list.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `shared`: identifiers, `Money`, `Quantity`
//!   - `checkout`: Order aggregate, reconciliation planner, `OrderRepository` port
//!
//! - **Application**: DTOs for JSON input and output
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: Order repository (SQLite via sqlx, in-memory)
//!
//! - **Config** and **Observability**: YAML settings, logging and metrics
//!
//! # Example
//!
//! ```ignore
//! use order_store::{OrderRepository, SqliteOrderRepository};
//!
//! let repo = SqliteOrderRepository::in_memory(true).await?;
//! repo.create(&order).await?;
//! order.change_item_quantity(&item_id, Quantity::new(3))?;
//! repo.update(&order).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Boundary DTOs.
pub mod application;

/// Infrastructure layer - Persistence adapters.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Logging and metrics.
pub mod observability;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::checkout::{
    Order, OrderError, OrderItem, OrderRepository, ReconciliationPlan, ReconciliationStep,
    RepositoryError,
};
pub use domain::shared::{CustomerId, DomainError, Money, OrderId, OrderItemId, ProductId, Quantity};

// Application re-exports
pub use application::dto::{CreateOrderDto, CreateOrderItemDto, OrderDto, OrderItemDto};

// Infrastructure re-exports
pub use infrastructure::persistence::{InMemoryOrderRepository, SqliteOrderRepository};
