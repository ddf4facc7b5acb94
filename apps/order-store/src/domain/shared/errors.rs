//! Validation failures raised while constructing identifiers, money and
//! quantities.

use std::fmt;

/// Rejection of a raw value by one of the shared value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field held a value its type does not admit.
    InvalidValue {
        /// Name of the offending field, e.g. `price`.
        field: String,
        /// Why the value was refused.
        message: String,
    },
}

impl DomainError {
    /// Shorthand for an [`DomainError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_field_and_reason() {
        let err = DomainError::invalid("order_id", "must not be blank");
        assert_eq!(err.to_string(), "Invalid value for 'order_id': must not be blank");
    }

    #[test]
    fn converts_into_boxed_error() {
        let boxed: Box<dyn std::error::Error + Send + Sync> =
            DomainError::invalid("price", "must not be negative").into();
        assert!(boxed.to_string().contains("price"));
    }
}
