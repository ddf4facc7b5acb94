//! Data Transfer Objects (DTOs)
//!
//! DTOs are used at the process boundary (JSON output, order intake).

mod order_dto;

pub use order_dto::{CreateOrderDto, CreateOrderItemDto, OrderDto, OrderItemDto};
