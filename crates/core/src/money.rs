use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A rupee amount with exact decimal semantics. Persisted as integer paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_paise(paise: i64) -> Self {
        Money(Decimal::from(paise) / Decimal::from(100))
    }

    pub fn to_paise(self) -> i64 {
        (self.0 * Decimal::from(100)).to_i64().unwrap()
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    /// Lossy conversion for wire formats that carry JSON numbers.
    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn paise_round_trip() {
        assert_eq!(Money::from_paise(12345).to_paise(), 12345);
        assert_eq!(Money::from_paise(0).to_paise(), 0);
    }

    #[test]
    fn from_decimal_rounds_to_two_places() {
        let m = Money::from_decimal(Decimal::from_str("123.456").unwrap());
        assert_eq!(m.to_paise(), 12346);
    }

    #[test]
    fn display_uses_rupee_symbol() {
        assert_eq!(Money::from_paise(45000).to_string(), "₹450.00");
    }

    #[test]
    fn is_positive_excludes_zero() {
        assert!(Money::from_paise(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!(Money::zero() - Money::from_paise(100)).is_positive());
    }

    #[test]
    fn arithmetic() {
        let sum = Money::from_paise(500) + Money::from_paise(250);
        assert_eq!(sum.to_paise(), 750);
        assert!((sum - Money::from_paise(750)).is_zero());
    }
}
