//! Quantity value object for item counts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// A non-negative whole number of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Zero units.
    pub const ZERO: Self = Self(0);

    /// Create a new quantity.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the inner value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Returns true if this quantity is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        Self::from(value.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Self).map_err(|_| {
            DomainError::invalid(
                "quantity",
                format!("{value} is outside the range 0..={}", u32::MAX),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_basics() {
        let q = Quantity::new(3);
        assert_eq!(q.value(), 3);
        assert_eq!(format!("{q}"), "3");
        assert!(Quantity::ZERO.is_zero());
        assert!(!q.is_zero());
    }

    #[test]
    fn quantity_from_i64() {
        assert_eq!(Quantity::try_from(7_i64).unwrap(), Quantity::new(7));
        assert!(Quantity::try_from(-1_i64).is_err());
        assert!(Quantity::try_from(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn quantity_into_i64() {
        assert_eq!(i64::from(Quantity::new(42)), 42);
    }
}
