//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up an order id with an item or product id.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

macro_rules! define_id {
    ($name:ident, $field:literal, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Reject blank identifiers.
            ///
            /// # Errors
            ///
            /// Returns error if the identifier is empty or whitespace only.
            pub fn validate(&self) -> Result<(), DomainError> {
                if self.0.trim().is_empty() {
                    return Err(DomainError::invalid($field, "identifier must not be blank"));
                }
                Ok(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(OrderId, "order_id", "Unique identifier for an order.");
define_id!(OrderItemId, "item_id", "Unique identifier for an order line item.");
define_id!(CustomerId, "customer_id", "Identifier of the customer placing an order.");
define_id!(ProductId, "product_id", "Identifier of the product an item refers to.");
