//! Checkout errors.
//!
//! [`OrderError`] covers aggregate invariants, [`RepositoryError`] is the
//! typed boundary every persistence adapter translates its failures into.

use std::fmt;

use crate::domain::shared::DomainError;

/// Errors raised by the Order aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Invalid order or item parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Two items of the same order share an identifier.
    DuplicateItem {
        /// Order ID.
        order_id: String,
        /// Offending item ID.
        item_id: String,
    },

    /// The order has no item with this identifier.
    ItemNotFound {
        /// Order ID.
        order_id: String,
        /// Missing item ID.
        item_id: String,
    },
}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidValue { field, message } => {
                Self::InvalidParameters { field, message }
            }
        }
    }
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid order parameter '{field}': {message}")
            }
            Self::DuplicateItem { order_id, item_id } => {
                write!(f, "Order {order_id} already contains item {item_id}")
            }
            Self::ItemNotFound { order_id, item_id } => {
                write!(f, "Order {order_id} has no item {item_id}")
            }
        }
    }
}

impl std::error::Error for OrderError {}

/// Errors surfaced by an [`OrderRepository`](super::OrderRepository).
///
/// Adapters translate backend-specific failures into these kinds before they
/// leave the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No stored order matches the identifier.
    NotFound {
        /// Order ID.
        order_id: String,
    },

    /// Duplicate identifier, foreign-key or check constraint failure.
    ConstraintViolation {
        /// Backend message.
        message: String,
    },

    /// Connection, pool or I/O failure.
    BackendUnavailable {
        /// Backend message.
        message: String,
    },

    /// A multi-write operation failed after some of its writes were applied.
    ///
    /// Only produced when atomic writes are disabled.
    PartialReconciliation {
        /// Order ID.
        order_id: String,
        /// Writes applied before the failure.
        completed_writes: usize,
        /// The failure that interrupted the operation.
        cause: Box<RepositoryError>,
    },

    /// A stored row cannot be mapped back into the domain.
    InvalidRecord {
        /// What was wrong with the row.
        message: String,
    },
}

impl RepositoryError {
    /// Create a not-found error for an order id.
    pub fn not_found(order_id: impl Into<String>) -> Self {
        Self::NotFound {
            order_id: order_id.into(),
        }
    }

    /// Create a constraint violation error.
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    /// Create a backend-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
        }
    }

    /// Create an invalid-record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Short, stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::ConstraintViolation { .. } => "constraint_violation",
            Self::BackendUnavailable { .. } => "backend_unavailable",
            Self::PartialReconciliation { .. } => "partial_reconciliation",
            Self::InvalidRecord { .. } => "invalid_record",
        }
    }

    /// Returns true for [`RepositoryError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { order_id } => write!(f, "Order not found: {order_id}"),
            Self::ConstraintViolation { message } => {
                write!(f, "Constraint violation: {message}")
            }
            Self::BackendUnavailable { message } => {
                write!(f, "Persistence backend unavailable: {message}")
            }
            Self::PartialReconciliation {
                order_id,
                completed_writes,
                cause,
            } => {
                write!(
                    f,
                    "Order {order_id} partially written ({completed_writes} writes applied): {cause}"
                )
            }
            Self::InvalidRecord { message } => write!(f, "Invalid stored record: {message}"),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PartialReconciliation { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}
