//! Order line item.

use crate::domain::checkout::errors::OrderError;
use crate::domain::shared::{Money, OrderItemId, ProductId, Quantity};

/// A line item owned by exactly one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    id: OrderItemId,
    name: String,
    price: Money,
    product_id: ProductId,
    quantity: Quantity,
    subtotal: Money,
}

impl OrderItem {
    /// Create a new order item.
    ///
    /// # Errors
    ///
    /// Returns error if an identifier or the name is blank, the price is
    /// negative, or price times quantity overflows.
    pub fn new(
        id: OrderItemId,
        name: impl Into<String>,
        price: Money,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Self, OrderError> {
        let name = name.into();

        id.validate()?;
        product_id.validate()?;
        price.validate_for_price()?;
        if name.trim().is_empty() {
            return Err(OrderError::InvalidParameters {
                field: "name".to_string(),
                message: "item name must not be blank".to_string(),
            });
        }

        let subtotal = subtotal_of(price, quantity)?;

        Ok(Self {
            id,
            name,
            price,
            product_id,
            quantity,
            subtotal,
        })
    }

    /// Get the item ID.
    #[must_use]
    pub const fn id(&self) -> &OrderItemId {
        &self.id
    }

    /// Get the item name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the unit price.
    #[must_use]
    pub const fn price(&self) -> Money {
        self.price
    }

    /// Get the product ID.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Get the quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Price times quantity.
    #[must_use]
    pub const fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Copy of this item with a different quantity.
    ///
    /// # Errors
    ///
    /// Returns error if the new subtotal overflows.
    pub fn with_quantity(&self, quantity: Quantity) -> Result<Self, OrderError> {
        Ok(Self {
            quantity,
            subtotal: subtotal_of(self.price, quantity)?,
            ..self.clone()
        })
    }
}

fn subtotal_of(price: Money, quantity: Quantity) -> Result<Money, OrderError> {
    price
        .checked_mul(quantity)
        .ok_or_else(|| OrderError::InvalidParameters {
            field: "quantity".to_string(),
            message: format!("{price} x {quantity} exceeds the representable amount"),
        })
}
