//! Row types for the `orders` and `order_items` tables.
//!
//! Money is stored as TEXT in its normalized decimal form so that no
//! precision is lost; quantities are INTEGER.

use std::str::FromStr;

use crate::domain::checkout::{Order, OrderItem, RepositoryError};
use crate::domain::shared::{CustomerId, Money, OrderId, OrderItemId, ProductId, Quantity};

/// One row of `orders`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderRecord {
    /// Primary key.
    pub id: String,
    /// Owning customer.
    pub customer_id: String,
    /// Stored total, decimal text.
    pub total: String,
}

impl OrderRecord {
    /// Build the row for an aggregate, with the aggregate's current total.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            total: order.total().to_storage_string(),
        }
    }

    /// Parse the stored total.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecord` if the column is not a decimal.
    pub fn total(&self) -> Result<Money, RepositoryError> {
        Money::from_str(&self.total).map_err(|e| {
            RepositoryError::invalid_record(format!("order {}: total: {e}", self.id))
        })
    }

    /// Rebuild the aggregate from this row and its item rows.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecord` if any column fails domain validation.
    pub fn into_order(self, items: Vec<OrderItemRecord>) -> Result<Order, RepositoryError> {
        let items = items
            .into_iter()
            .map(OrderItemRecord::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        let id = self.id;
        Order::new(
            OrderId::new(id.clone()),
            CustomerId::new(self.customer_id),
            items,
        )
        .map_err(|e| RepositoryError::invalid_record(format!("order {id}: {e}")))
    }
}

/// One row of `order_items`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderItemRecord {
    /// Primary key.
    pub id: String,
    /// Parent order.
    pub order_id: String,
    /// Display name.
    pub name: String,
    /// Unit price, decimal text.
    pub price: String,
    /// Referenced product.
    pub product_id: String,
    /// Units ordered.
    pub quantity: i64,
}

impl OrderItemRecord {
    /// Build the row for an item of `order_id`.
    #[must_use]
    pub fn from_item(order_id: &OrderId, item: &OrderItem) -> Self {
        Self {
            id: item.id().to_string(),
            order_id: order_id.to_string(),
            name: item.name().to_string(),
            price: item.price().to_storage_string(),
            product_id: item.product_id().to_string(),
            quantity: i64::from(item.quantity()),
        }
    }

    /// Rebuild the domain item.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecord` if the price, quantity or any identifier is
    /// not valid.
    pub fn into_item(self) -> Result<OrderItem, RepositoryError> {
        let context = |e: &dyn std::fmt::Display| {
            RepositoryError::invalid_record(format!("order item {}: {e}", self.id))
        };

        let price = Money::from_str(&self.price).map_err(|e| context(&e))?;
        let quantity = Quantity::try_from(self.quantity).map_err(|e| context(&e))?;

        OrderItem::new(
            OrderItemId::new(self.id.clone()),
            self.name.clone(),
            price,
            ProductId::new(self.product_id.clone()),
            quantity,
        )
        .map_err(|e| context(&e))
    }
}
