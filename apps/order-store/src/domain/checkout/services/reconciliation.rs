//! Item reconciliation planning.
//!
//! Computes the item-level writes that turn a persisted item list into a
//! desired one. Matching is by item identifier only.
//!
//! # Rules
//!
//! - Persisted items missing from the desired list are removed, in persisted
//!   order, before anything else.
//! - Desired items are then visited in caller order: unknown ids are
//!   inserted, known ids with a different quantity get a quantity change.
//! - A known id with the same quantity produces no step, even when its name,
//!   price or product id differ. Quantity is the only field reconciled in
//!   place.

use std::collections::{HashMap, HashSet};

use crate::domain::checkout::aggregate::OrderItem;
use crate::domain::shared::{OrderItemId, Quantity};

/// One item-level write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationStep {
    /// Delete the persisted item.
    Remove(OrderItem),
    /// Insert a new item.
    Insert(OrderItem),
    /// Overwrite the quantity of a persisted item.
    ChangeQuantity {
        /// The desired item (its quantity is the new value).
        item: OrderItem,
        /// The quantity currently persisted.
        previous: Quantity,
    },
}

impl ReconciliationStep {
    /// Identifier of the item this step touches.
    #[must_use]
    pub const fn item_id(&self) -> &OrderItemId {
        match self {
            Self::Remove(item) | Self::Insert(item) | Self::ChangeQuantity { item, .. } => {
                item.id()
            }
        }
    }

    /// Label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Remove(_) => "remove",
            Self::Insert(_) => "insert",
            Self::ChangeQuantity { .. } => "change_quantity",
        }
    }
}

/// Ordered list of item writes produced by [`ReconciliationPlan::between`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    steps: Vec<ReconciliationStep>,
}

impl ReconciliationPlan {
    /// Plan the writes that turn `persisted` into `desired`.
    ///
    /// Both slices are expected to have unique item ids. Runs in linear time.
    #[must_use]
    pub fn between(persisted: &[OrderItem], desired: &[OrderItem]) -> Self {
        let desired_ids: HashSet<&OrderItemId> = desired.iter().map(OrderItem::id).collect();
        let persisted_by_id: HashMap<&OrderItemId, &OrderItem> =
            persisted.iter().map(|item| (item.id(), item)).collect();

        let mut steps: Vec<ReconciliationStep> = persisted
            .iter()
            .filter(|item| !desired_ids.contains(item.id()))
            .cloned()
            .map(ReconciliationStep::Remove)
            .collect();

        for item in desired {
            match persisted_by_id.get(item.id()) {
                None => steps.push(ReconciliationStep::Insert(item.clone())),
                Some(old) if old.quantity() != item.quantity() => {
                    steps.push(ReconciliationStep::ChangeQuantity {
                        item: item.clone(),
                        previous: old.quantity(),
                    });
                }
                Some(_) => {}
            }
        }

        Self { steps }
    }

    /// All steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[ReconciliationStep] {
        &self.steps
    }

    /// Items to delete.
    pub fn removals(&self) -> impl Iterator<Item = &OrderItem> {
        self.steps.iter().filter_map(|step| match step {
            ReconciliationStep::Remove(item) => Some(item),
            _ => None,
        })
    }

    /// Items to insert.
    pub fn insertions(&self) -> impl Iterator<Item = &OrderItem> {
        self.steps.iter().filter_map(|step| match step {
            ReconciliationStep::Insert(item) => Some(item),
            _ => None,
        })
    }

    /// Items whose quantity changes.
    pub fn quantity_changes(&self) -> impl Iterator<Item = &OrderItem> {
        self.steps.iter().filter_map(|step| match step {
            ReconciliationStep::ChangeQuantity { item, .. } => Some(item),
            _ => None,
        })
    }

    /// Returns true when nothing needs to be written at item level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of item-level writes.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.steps.len()
    }
}

impl IntoIterator for ReconciliationPlan {
    type Item = ReconciliationStep;
    type IntoIter = std::vec::IntoIter<ReconciliationStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{Money, ProductId};
    use proptest::prelude::*;
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

    fn widget(qty: u32) -> OrderItem {
        item("i1", "Widget", Money::new(dec!(10)), "p1", qty)
    }

    fn gadget(qty: u32) -> OrderItem {
        item("i2", "Gadget", Money::new(dec!(5)), "p2", qty)
    }

    fn ids<'a>(items: impl Iterator<Item = &'a OrderItem>) -> Vec<&'a str> {
        items.map(|i| i.id().as_str()).collect()
    }

    #[test]
    fn identical_lists_need_no_writes() {
        let plan = ReconciliationPlan::between(&[widget(2)], &[widget(2)]);
        assert!(plan.is_empty());
        assert_eq!(plan.operation_count(), 0);
    }

    #[test]
    fn quantity_change_and_insert() {
        let plan = ReconciliationPlan::between(&[widget(2)], &[widget(3), gadget(1)]);

        assert_eq!(
            plan.steps(),
            &[
                ReconciliationStep::ChangeQuantity {
                    item: widget(3),
                    previous: Quantity::new(2),
                },
                ReconciliationStep::Insert(gadget(1)),
            ]
        );
    }

    #[test]
    fn empty_desired_removes_everything() {
        let plan = ReconciliationPlan::between(&[widget(2), gadget(1)], &[]);

        assert_eq!(ids(plan.removals()), vec!["i1", "i2"]);
        assert_eq!(plan.insertions().count(), 0);
        assert_eq!(plan.quantity_changes().count(), 0);
    }

    #[test]
    fn removals_come_first() {
        let c = item("i3", "Cog", Money::new(dec!(1)), "p3", 4);
        let plan = ReconciliationPlan::between(&[widget(2), gadget(1)], &[c.clone(), widget(9)]);

        let kinds: Vec<&str> = plan.steps().iter().map(ReconciliationStep::kind).collect();
        assert_eq!(kinds, vec!["remove", "insert", "change_quantity"]);
        assert_eq!(plan.steps()[0].item_id().as_str(), "i2");
        assert_eq!(plan.steps()[1].item_id(), c.id());
    }

    #[test]
    fn other_field_changes_are_ignored() {
        let renamed = item("i1", "Renamed", Money::new(dec!(99)), "p9", 2);
        let plan = ReconciliationPlan::between(&[widget(2)], &[renamed]);
        assert!(plan.is_empty());
    }

    #[test]
    fn into_iter_yields_steps_in_order() {
        let plan = ReconciliationPlan::between(&[gadget(1)], &[widget(1)]);
        let kinds: Vec<&str> = plan.into_iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec!["remove", "insert"]);
    }

    /// Apply a plan to a persisted list the way a store would.
    fn apply(persisted: &[OrderItem], plan: &ReconciliationPlan) -> Vec<OrderItem> {
        let mut rows: Vec<OrderItem> = persisted.to_vec();
        for step in plan.steps() {
            match step {
                ReconciliationStep::Remove(item) => rows.retain(|r| r.id() != item.id()),
                ReconciliationStep::Insert(item) => rows.push(item.clone()),
                ReconciliationStep::ChangeQuantity { item, .. } => {
                    for row in &mut rows {
                        if row.id() == item.id() {
                            *row = row.with_quantity(item.quantity()).unwrap();
                        }
                    }
                }
            }
        }
        rows
    }

    fn items_strategy() -> impl Strategy<Value = Vec<OrderItem>> {
        proptest::collection::btree_map(0_u8..12, (0_u32..5, 1_i64..500, 0_u8..3), 0..8).prop_map(
            |entries| {
                entries
                    .into_iter()
                    .map(|(id, (qty, cents, variant))| {
                        item(
                            &format!("i{id}"),
                            &format!("name-{variant}"),
                            Money::from_cents(cents),
                            &format!("p{variant}"),
                            qty,
                        )
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn applying_plan_yields_desired_ids_and_quantities(
            persisted in items_strategy(),
            desired in items_strategy(),
        ) {
            let plan = ReconciliationPlan::between(&persisted, &desired);
            let result = apply(&persisted, &plan);

            let mut got: Vec<(String, u32)> = result
                .iter()
                .map(|i| (i.id().to_string(), i.quantity().value()))
                .collect();
            let mut want: Vec<(String, u32)> = desired
                .iter()
                .map(|i| (i.id().to_string(), i.quantity().value()))
                .collect();
            got.sort();
            want.sort();
            prop_assert_eq!(got, want);

            // Items kept from the persisted list keep their persisted fields.
            for row in &result {
                if let Some(old) = persisted.iter().find(|p| p.id() == row.id()) {
                    prop_assert_eq!(row.name(), old.name());
                    prop_assert_eq!(row.price(), old.price());
                    prop_assert_eq!(row.product_id(), old.product_id());
                }
            }
        }

        #[test]
        fn second_pass_is_empty(
            persisted in items_strategy(),
            desired in items_strategy(),
        ) {
            let plan = ReconciliationPlan::between(&persisted, &desired);
            let result = apply(&persisted, &plan);
            prop_assert!(ReconciliationPlan::between(&result, &desired).is_empty());
        }
    }
}
