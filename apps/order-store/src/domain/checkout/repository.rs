//! Order Repository Trait
//!
//! Defines the persistence abstraction for orders.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;

use super::aggregate::{Order, OrderItem};
use super::errors::RepositoryError;
use super::services::ReconciliationPlan;
use crate::domain::shared::{Money, OrderId};

/// Repository trait for Order persistence.
///
/// Every write also refreshes the stored order total so that it equals the
/// sum of `price * quantity` over the stored items once the call returns.
/// Item-level calls are scoped by the parent order's identifier.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store a new order together with all of its items.
    ///
    /// # Errors
    ///
    /// Returns `ConstraintViolation` if the order or any item id is already
    /// stored.
    async fn create(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Store one new item under an existing order.
    ///
    /// `order` is the aggregate that already contains `item`; its total is
    /// what gets written back.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order is not stored, `ConstraintViolation`
    /// if the item id is taken.
    async fn add_order_item(&self, order: &Order, item: &OrderItem)
    -> Result<(), RepositoryError>;

    /// Delete one item of an order.
    ///
    /// Deleting an item that is not stored is not an error; the total is
    /// still refreshed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order is not stored.
    async fn delete_order_item(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError>;

    /// Overwrite the stored quantity of one item.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order is not stored.
    async fn update_order_item_quantity(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError>;

    /// Reconcile the stored order with the aggregate.
    ///
    /// Removes stored items the aggregate no longer has, inserts new ones,
    /// rewrites changed quantities, then writes customer and total.
    /// Name, price and product id of items that already exist are left as
    /// stored. Returns the item writes that were applied; an order that is
    /// already in sync yields an empty plan.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order is not stored. With atomic writes
    /// disabled a failure after some writes yields `PartialReconciliation`.
    async fn update(&self, order: &Order) -> Result<ReconciliationPlan, RepositoryError>;

    /// Load one order with its items in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no order has this id.
    async fn find(&self, id: &OrderId) -> Result<Order, RepositoryError>;

    /// Load every stored order.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails or a row cannot be mapped.
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Read the total column as stored, without recomputing it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no order has this id.
    async fn stored_total(&self, id: &OrderId) -> Result<Money, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl OrderRepository for Unreachable {
        async fn create(&self, _: &Order) -> Result<(), RepositoryError> {
            Err(RepositoryError::unavailable("offline"))
        }
        async fn add_order_item(&self, _: &Order, _: &OrderItem) -> Result<(), RepositoryError> {
            Err(RepositoryError::unavailable("offline"))
        }
        async fn delete_order_item(&self, _: &Order, _: &OrderItem) -> Result<(), RepositoryError> {
            Err(RepositoryError::unavailable("offline"))
        }
        async fn update_order_item_quantity(
            &self,
            _: &Order,
            _: &OrderItem,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::unavailable("offline"))
        }
        async fn update(&self, _: &Order) -> Result<ReconciliationPlan, RepositoryError> {
            Err(RepositoryError::unavailable("offline"))
        }
        async fn find(&self, id: &OrderId) -> Result<Order, RepositoryError> {
            Err(RepositoryError::not_found(id.as_str()))
        }
        async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn stored_total(&self, id: &OrderId) -> Result<Money, RepositoryError> {
            Err(RepositoryError::not_found(id.as_str()))
        }
    }

    #[tokio::test]
    async fn usable_as_trait_object() {
        let repo: Arc<dyn OrderRepository> = Arc::new(Unreachable);

        assert!(repo.find_all().await.unwrap().is_empty());
        let err = repo.find(&OrderId::new("o1")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
