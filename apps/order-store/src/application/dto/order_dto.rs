//! Order DTOs

use serde::{Deserialize, Serialize};

use crate::domain::checkout::{Order, OrderError, OrderItem};
use crate::domain::shared::{CustomerId, Money, OrderId, OrderItemId, ProductId, Quantity};

/// DTO for one item of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderItemDto {
    /// Item ID.
    pub id: String,
    /// Name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Product ID.
    pub product_id: String,
    /// Quantity.
    pub quantity: u32,
}

impl CreateOrderItemDto {
    /// Convert to a domain item.
    ///
    /// # Errors
    ///
    /// Returns error if the item fails domain validation.
    pub fn to_domain(&self) -> Result<OrderItem, OrderError> {
        OrderItem::new(
            OrderItemId::new(&self.id),
            self.name.as_str(),
            self.price,
            ProductId::new(&self.product_id),
            Quantity::new(self.quantity),
        )
    }
}

/// DTO for creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderDto {
    /// Order ID. Generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Customer ID.
    pub customer_id: String,
    /// Initial items.
    #[serde(default)]
    pub items: Vec<CreateOrderItemDto>,
}

impl CreateOrderDto {
    /// Convert to a domain order.
    ///
    /// # Errors
    ///
    /// Returns error if the order or any item fails domain validation.
    pub fn to_domain(&self) -> Result<Order, OrderError> {
        let id = self
            .id
            .as_deref()
            .map_or_else(OrderId::generate, OrderId::new);
        let items = self
            .items
            .iter()
            .map(CreateOrderItemDto::to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Order::new(id, CustomerId::new(&self.customer_id), items)
    }
}

/// DTO representing an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemDto {
    /// Item ID.
    pub id: String,
    /// Name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Product ID.
    pub product_id: String,
    /// Quantity.
    pub quantity: u32,
    /// Price times quantity.
    pub subtotal: Money,
}

impl From<&OrderItem> for OrderItemDto {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            price: item.price(),
            product_id: item.product_id().to_string(),
            quantity: item.quantity().value(),
            subtotal: item.subtotal(),
        }
    }
}

/// DTO representing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDto {
    /// Order ID.
    pub id: String,
    /// Customer ID.
    pub customer_id: String,
    /// Items in insertion order.
    pub items: Vec<OrderItemDto>,
    /// Sum of item subtotals.
    pub total: Money,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            items: order.items().iter().map(OrderItemDto::from).collect(),
            total: order.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_dto() -> CreateOrderDto {
        CreateOrderDto {
            id: Some("o1".to_string()),
            customer_id: "c1".to_string(),
            items: vec![CreateOrderItemDto {
                id: "i1".to_string(),
                name: "Widget".to_string(),
                price: Money::new(dec!(10)),
                product_id: "p1".to_string(),
                quantity: 2,
            }],
        }
    }

    #[test]
    fn create_dto_to_domain() {
        let order = create_dto().to_domain().unwrap();

        assert_eq!(order.id().as_str(), "o1");
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total(), Money::new(dec!(20)));
    }

    #[test]
    fn create_dto_generates_missing_id() {
        let dto = CreateOrderDto {
            id: None,
            ..create_dto()
        };
        let order = dto.to_domain().unwrap();
        assert!(!order.id().as_str().is_empty());
    }

    #[test]
    fn create_dto_rejects_invalid_item() {
        let mut dto = create_dto();
        dto.items[0].name = String::new();
        assert!(dto.to_domain().is_err());
    }

    #[test]
    fn create_dto_from_json() {
        let json = r#"{
            "customer_id": "c1",
            "items": [
                {"id": "i1", "name": "Widget", "price": "10.00", "product_id": "p1", "quantity": 3}
            ]
        }"#;
        let dto: CreateOrderDto = serde_json::from_str(json).unwrap();
        let order = dto.to_domain().unwrap();
        assert_eq!(order.total(), Money::new(dec!(30)));
    }

    #[test]
    fn order_dto_from_domain() {
        let order = create_dto().to_domain().unwrap();
        let dto = OrderDto::from(&order);

        assert_eq!(dto.id, "o1");
        assert_eq!(dto.items[0].subtotal, Money::new(dec!(20)));
        assert_eq!(dto.total, Money::new(dec!(20)));

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["customer_id"], "c1");
        assert_eq!(json["items"][0]["quantity"], 2);
    }
}
