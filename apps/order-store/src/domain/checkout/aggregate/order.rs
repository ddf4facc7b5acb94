//! Order Aggregate Root
//!
//! An order is a customer reference plus an ordered list of line items.
//! The total is always derived from the current items and is checked to fit
//! whenever the item list changes.

use std::collections::HashSet;

use super::OrderItem;
use crate::domain::checkout::errors::OrderError;
use crate::domain::shared::{CustomerId, Money, OrderId, OrderItemId, Quantity};

/// Order Aggregate Root.
///
/// Item identifiers are unique within an order; they are the key the
/// repository reconciles on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<OrderItem>,
    total: Money,
}

impl Order {
    /// Create an order with its initial items.
    ///
    /// # Errors
    ///
    /// Returns error if an identifier is blank, two items share an id, or
    /// the total overflows.
    pub fn new(
        id: OrderId,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        id.validate()?;
        customer_id.validate()?;
        ensure_unique_items(&id, &items)?;
        let total = total_of(&items)?;

        Ok(Self {
            id,
            customer_id,
            items,
            total,
        })
    }

    /// Get the order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Get the customer ID.
    #[must_use]
    pub const fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Get the items in their current order.
    #[must_use]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, item_id: &OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    /// Sum of price times quantity over all items.
    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    /// Append an item.
    ///
    /// # Errors
    ///
    /// Returns error if the order already has an item with the same id or
    /// the new total overflows.
    pub fn add_item(&mut self, item: OrderItem) -> Result<(), OrderError> {
        if self.item(item.id()).is_some() {
            return Err(OrderError::DuplicateItem {
                order_id: self.id.to_string(),
                item_id: item.id().to_string(),
            });
        }
        self.total = add_subtotal(self.total, &item)?;
        self.items.push(item);
        Ok(())
    }

    /// Remove an item and return it.
    ///
    /// # Errors
    ///
    /// Returns error if the order has no such item.
    pub fn remove_item(&mut self, item_id: &OrderItemId) -> Result<OrderItem, OrderError> {
        let index = self.position(item_id)?;
        let removed = self.items.remove(index);
        self.total = total_of(&self.items)?;
        Ok(removed)
    }

    /// Change the quantity of an item and return the updated item.
    ///
    /// # Errors
    ///
    /// Returns error if the order has no such item or the new total
    /// overflows.
    pub fn change_item_quantity(
        &mut self,
        item_id: &OrderItemId,
        quantity: Quantity,
    ) -> Result<OrderItem, OrderError> {
        let index = self.position(item_id)?;
        let updated = self.items[index].with_quantity(quantity)?;
        let previous = std::mem::replace(&mut self.items[index], updated.clone());
        match total_of(&self.items) {
            Ok(total) => {
                self.total = total;
                Ok(updated)
            }
            Err(err) => {
                self.items[index] = previous;
                Err(err)
            }
        }
    }

    /// Replace the whole item list.
    ///
    /// # Errors
    ///
    /// Returns error if two of the new items share an id or their total
    /// overflows.
    pub fn replace_items(&mut self, items: Vec<OrderItem>) -> Result<(), OrderError> {
        ensure_unique_items(&self.id, &items)?;
        self.total = total_of(&items)?;
        self.items = items;
        Ok(())
    }

    /// Reassign the order to another customer.
    ///
    /// # Errors
    ///
    /// Returns error if the customer id is blank.
    pub fn change_customer(&mut self, customer_id: CustomerId) -> Result<(), OrderError> {
        customer_id.validate()?;
        self.customer_id = customer_id;
        Ok(())
    }

    fn position(&self, item_id: &OrderItemId) -> Result<usize, OrderError> {
        self.items
            .iter()
            .position(|item| item.id() == item_id)
            .ok_or_else(|| OrderError::ItemNotFound {
                order_id: self.id.to_string(),
                item_id: item_id.to_string(),
            })
    }
}

fn total_of(items: &[OrderItem]) -> Result<Money, OrderError> {
    items.iter().try_fold(Money::ZERO, add_subtotal)
}

fn add_subtotal(total: Money, item: &OrderItem) -> Result<Money, OrderError> {
    total
        .checked_add(item.subtotal())
        .ok_or_else(|| OrderError::InvalidParameters {
            field: "total".to_string(),
            message: format!("adding item {} exceeds the representable amount", item.id()),
        })
}

fn ensure_unique_items(order_id: &OrderId, items: &[OrderItem]) -> Result<(), OrderError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(OrderError::DuplicateItem {
                order_id: order_id.to_string(),
                item_id: item.id().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::ProductId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn item(id: &str, name: &str, price: Money, product: &str, qty: u32) -> OrderItem {
        OrderItem::new(
            OrderItemId::new(id),
            name,
            price,
            ProductId::new(product),
            Quantity::new(qty),
        )
        .unwrap()
    }

    fn widget() -> OrderItem {
        item("i1", "Widget", Money::new(dec!(10)), "p1", 2)
    }

    fn gadget() -> OrderItem {
        item("i2", "Gadget", Money::new(dec!(5)), "p2", 1)
    }

    fn make_order() -> Order {
        Order::new(OrderId::new("o1"), CustomerId::new("c1"), vec![widget()]).unwrap()
    }

    #[test]
    fn order_new_computes_total() {
        let order = make_order();

        assert_eq!(order.id().as_str(), "o1");
        assert_eq!(order.customer_id().as_str(), "c1");
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total(), Money::new(dec!(20)));
    }

    #[test]
    fn order_without_items_has_zero_total() {
        let order = Order::new(OrderId::new("o1"), CustomerId::new("c1"), vec![]).unwrap();
        assert_eq!(order.total(), Money::ZERO);
    }

    #[test]
    fn order_rejects_duplicate_item_ids() {
        let result = Order::new(
            OrderId::new("o1"),
            CustomerId::new("c1"),
            vec![widget(), widget()],
        );

        assert_eq!(
            result.unwrap_err(),
            OrderError::DuplicateItem {
                order_id: "o1".to_string(),
                item_id: "i1".to_string(),
            }
        );
    }

    #[test]
    fn order_rejects_blank_customer() {
        let result = Order::new(OrderId::new("o1"), CustomerId::new(""), vec![]);
        assert!(matches!(
            result,
            Err(OrderError::InvalidParameters { ref field, .. }) if field == "customer_id"
        ));
    }

    #[test]
    fn add_item_updates_total() {
        let mut order = make_order();
        order.add_item(gadget()).unwrap();

        assert_eq!(order.items().len(), 2);
        assert_eq!(order.total(), Money::new(dec!(25)));
    }

    #[test]
    fn add_item_rejects_duplicate() {
        let mut order = make_order();
        assert!(order.add_item(widget()).is_err());
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn remove_item_returns_removed() {
        let mut order = make_order();
        let removed = order.remove_item(&OrderItemId::new("i1")).unwrap();

        assert_eq!(removed, widget());
        assert!(order.items().is_empty());
        assert_eq!(order.total(), Money::ZERO);
    }

    #[test]
    fn remove_missing_item_fails() {
        let mut order = make_order();
        let err = order.remove_item(&OrderItemId::new("nope")).unwrap_err();
        assert!(matches!(err, OrderError::ItemNotFound { .. }));
    }

    #[test]
    fn change_item_quantity_updates_total() {
        let mut order = make_order();
        let updated = order
            .change_item_quantity(&OrderItemId::new("i1"), Quantity::new(3))
            .unwrap();

        assert_eq!(updated.quantity(), Quantity::new(3));
        assert_eq!(order.item(&OrderItemId::new("i1")), Some(&updated));
        assert_eq!(order.total(), Money::new(dec!(30)));
    }

    #[test]
    fn replace_items_keeps_caller_order() {
        let mut order = make_order();
        order
            .replace_items(vec![gadget(), widget().with_quantity(Quantity::new(3)).unwrap()])
            .unwrap();

        let ids: Vec<&str> = order.items().iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["i2", "i1"]);
        assert_eq!(order.total(), Money::new(dec!(35)));
    }

    #[test]
    fn replace_items_rejects_duplicates_and_keeps_state() {
        let mut order = make_order();
        assert!(order.replace_items(vec![gadget(), gadget()]).is_err());
        assert_eq!(order.items(), &[widget()]);
    }

    #[test]
    fn overflowing_total_is_rejected_and_state_kept() {
        let huge = item("i9", "Gold", Money::new(Decimal::MAX), "p9", 1);

        let err = Order::new(
            OrderId::new("o1"),
            CustomerId::new("c1"),
            vec![widget(), huge.clone()],
        )
        .unwrap_err();
        assert!(matches!(err, OrderError::InvalidParameters { ref field, .. } if field == "total"));

        let mut order = make_order();
        assert!(order.add_item(huge.clone()).is_err());
        assert_eq!(order.items(), &[widget()]);
        assert_eq!(order.total(), Money::new(dec!(20)));

        assert!(order.replace_items(vec![widget(), huge.clone()]).is_err());
        assert_eq!(order.total(), Money::new(dec!(20)));

        let mut alone = Order::new(OrderId::new("o2"), CustomerId::new("c1"), vec![huge]).unwrap();
        alone.add_item(item("i1", "Widget", Money::ZERO, "p1", 1)).unwrap();
        assert!(
            alone
                .change_item_quantity(&OrderItemId::new("i9"), Quantity::new(2))
                .is_err()
        );
        assert_eq!(alone.total(), Money::new(Decimal::MAX));
        assert_eq!(alone.item(&OrderItemId::new("i9")).unwrap().quantity(), Quantity::new(1));
    }

    #[test]
    fn change_customer() {
        let mut order = make_order();
        order.change_customer(CustomerId::new("c2")).unwrap();
        assert_eq!(order.customer_id().as_str(), "c2");

        assert!(order.change_customer(CustomerId::new(" ")).is_err());
        assert_eq!(order.customer_id().as_str(), "c2");
    }
}
