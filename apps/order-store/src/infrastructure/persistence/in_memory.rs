//! In-memory order repository for testing.
//!
//! Mirrors the SQLite adapter's observable behavior: item ids are unique
//! across all orders, items keep insertion order, and the stored total is a
//! separate value refreshed by every write. Each call validates before it
//! mutates, so a failed call leaves the store untouched.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::checkout::{
    Order, OrderItem, OrderRepository, ReconciliationPlan, ReconciliationStep, RepositoryError,
};
use crate::domain::shared::{CustomerId, Money, OrderId, OrderItemId};
use crate::observability::{record_reconciliation, record_repository_operation};

const BACKEND: &str = "in_memory";

#[derive(Debug, Clone)]
struct StoredOrder {
    customer_id: CustomerId,
    total: Money,
    items: Vec<OrderItem>,
}

#[derive(Debug, Default)]
struct Store {
    orders: HashMap<OrderId, StoredOrder>,
    /// Order ids in insertion order.
    sequence: Vec<OrderId>,
    /// Owning order of every stored item.
    item_owners: HashMap<OrderItemId, OrderId>,
}

impl Store {
    fn order_mut(&mut self, id: &OrderId) -> Result<&mut StoredOrder, RepositoryError> {
        self.orders
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found(id.as_str()))
    }

    fn ensure_item_free(&self, item_id: &OrderItemId) -> Result<(), RepositoryError> {
        match self.item_owners.get(item_id) {
            Some(owner) => Err(RepositoryError::constraint(format!(
                "item {item_id} already stored under order {owner}"
            ))),
            None => Ok(()),
        }
    }

    fn rebuild(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        let stored = self
            .orders
            .get(id)
            .ok_or_else(|| RepositoryError::not_found(id.as_str()))?;

        Order::new(id.clone(), stored.customer_id.clone(), stored.items.clone())
            .map_err(|e| RepositoryError::invalid_record(format!("order {id}: {e}")))
    }
}

/// Apply the caller's quantity to a stored item, keeping the stored fields.
fn requantify(stored: &OrderItem, desired: &OrderItem) -> Result<OrderItem, RepositoryError> {
    stored
        .with_quantity(desired.quantity())
        .map_err(|e| RepositoryError::constraint(format!("item {}: {e}", stored.id())))
}

/// In-memory implementation of `OrderRepository`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    store: RwLock<Store>,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of orders in the repository.
    pub async fn len(&self) -> usize {
        self.store.read().await.orders.len()
    }

    /// Check if the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.orders.is_empty()
    }

    /// Clear all orders from the repository.
    pub async fn clear(&self) {
        *self.store.write().await = Store::default();
    }

    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;

        if store.orders.contains_key(order.id()) {
            return Err(RepositoryError::constraint(format!(
                "order {} already stored",
                order.id()
            )));
        }
        for item in order.items() {
            store.ensure_item_free(item.id())?;
        }

        for item in order.items() {
            store
                .item_owners
                .insert(item.id().clone(), order.id().clone());
        }
        store.sequence.push(order.id().clone());
        store.orders.insert(
            order.id().clone(),
            StoredOrder {
                customer_id: order.customer_id().clone(),
                total: order.total(),
                items: order.items().to_vec(),
            },
        );
        Ok(())
    }

    async fn add_item(&self, order: &Order, item: &OrderItem) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;

        store.order_mut(order.id())?;
        store.ensure_item_free(item.id())?;

        store
            .item_owners
            .insert(item.id().clone(), order.id().clone());
        let stored = store.order_mut(order.id())?;
        stored.items.push(item.clone());
        stored.total = order.total();
        Ok(())
    }

    async fn remove_item(&self, order: &Order, item: &OrderItem) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;

        let stored = store.order_mut(order.id())?;
        let before = stored.items.len();
        stored.items.retain(|stored_item| stored_item.id() != item.id());
        let removed = stored.items.len() != before;
        stored.total = order.total();

        if removed {
            store.item_owners.remove(item.id());
        } else {
            debug!(item_id = %item.id(), "Item not stored, nothing deleted");
        }
        Ok(())
    }

    async fn change_quantity(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;

        let stored = store.order_mut(order.id())?;
        match stored.items.iter_mut().find(|s| s.id() == item.id()) {
            Some(stored_item) => *stored_item = requantify(stored_item, item)?,
            None => debug!(item_id = %item.id(), "Item not stored, quantity unchanged"),
        }
        stored.total = order.total();
        Ok(())
    }

    async fn reconcile(&self, order: &Order) -> Result<ReconciliationPlan, RepositoryError> {
        let mut store = self.store.write().await;

        let mut items = store.order_mut(order.id())?.items.clone();
        let plan = ReconciliationPlan::between(&items, order.items());
        for item in plan.insertions() {
            store.ensure_item_free(item.id())?;
        }

        for step in plan.steps() {
            match step {
                ReconciliationStep::Remove(item) => items.retain(|s| s.id() != item.id()),
                ReconciliationStep::Insert(item) => items.push(item.clone()),
                ReconciliationStep::ChangeQuantity { item, .. } => {
                    if let Some(s) = items.iter_mut().find(|s| s.id() == item.id()) {
                        *s = requantify(s, item)?;
                    }
                }
            }
        }

        for item in plan.removals() {
            store.item_owners.remove(item.id());
        }
        for item in plan.insertions() {
            store
                .item_owners
                .insert(item.id().clone(), order.id().clone());
        }

        let stored = store.order_mut(order.id())?;
        stored.items = items;
        stored.customer_id = order.customer_id().clone();
        stored.total = order.total();

        Ok(plan)
    }

    async fn load_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let store = self.store.read().await;
        store.sequence.iter().map(|id| store.rebuild(id)).collect()
    }

    async fn load_total(&self, id: &OrderId) -> Result<Money, RepositoryError> {
        let store = self.store.read().await;
        store
            .orders
            .get(id)
            .map(|stored| stored.total)
            .ok_or_else(|| RepositoryError::not_found(id.as_str()))
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    #[instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        let started = Instant::now();
        let result = self.create_order(order).await;
        record_repository_operation(BACKEND, "create", &result, started.elapsed());
        result
    }

    #[instrument(skip(self, order, item), fields(order_id = %order.id(), item_id = %item.id()))]
    async fn add_order_item(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError> {
        let started = Instant::now();
        let result = self.add_item(order, item).await;
        record_repository_operation(BACKEND, "add_order_item", &result, started.elapsed());
        result
    }

    #[instrument(skip(self, order, item), fields(order_id = %order.id(), item_id = %item.id()))]
    async fn delete_order_item(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError> {
        let started = Instant::now();
        let result = self.remove_item(order, item).await;
        record_repository_operation(BACKEND, "delete_order_item", &result, started.elapsed());
        result
    }

    #[instrument(skip(self, order, item), fields(order_id = %order.id(), item_id = %item.id()))]
    async fn update_order_item_quantity(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError> {
        let started = Instant::now();
        let result = self.change_quantity(order, item).await;
        record_repository_operation(
            BACKEND,
            "update_order_item_quantity",
            &result,
            started.elapsed(),
        );
        result
    }

    #[instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn update(&self, order: &Order) -> Result<ReconciliationPlan, RepositoryError> {
        let started = Instant::now();
        let result = self.reconcile(order).await;
        record_repository_operation(BACKEND, "update", &result, started.elapsed());

        let plan = result?;
        record_reconciliation(&plan);
        debug!(operations = plan.operation_count(), "Order reconciled");
        Ok(plan)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn find(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        let started = Instant::now();
        let result = self.store.read().await.rebuild(id);
        record_repository_operation(BACKEND, "find", &result, started.elapsed());
        result
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let started = Instant::now();
        let result = self.load_all().await;
        record_repository_operation(BACKEND, "find_all", &result, started.elapsed());
        result
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn stored_total(&self, id: &OrderId) -> Result<Money, RepositoryError> {
        let started = Instant::now();
        let result = self.load_total(id).await;
        record_repository_operation(BACKEND, "stored_total", &result, started.elapsed());
        result
    }
}
