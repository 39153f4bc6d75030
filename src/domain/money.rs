use crate::error::{BookingError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative amount of money in Indian rupees.
///
/// Wraps `rust_decimal::Decimal` so prices, discounts and payment splits can
/// never go below zero, and serializes as a plain JSON number because that is
/// what the backend expects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "RawRupees", into = "RawRupees")]
pub struct Rupees(Decimal);

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct RawRupees(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl TryFrom<RawRupees> for Rupees {
    type Error = BookingError;

    fn try_from(raw: RawRupees) -> Result<Self> {
        Self::new(raw.0)
    }
}

impl From<Rupees> for RawRupees {
    fn from(value: Rupees) -> Self {
        RawRupees(value.0)
    }
}

impl Rupees {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(BookingError::Validation(
                "Amount cannot be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtracts `rhs`, flooring the result at zero.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if self.0 > rhs.0 {
            Self(self.0 - rhs.0)
        } else {
            Self::ZERO
        }
    }

    /// Half of the amount, rounded to the nearest whole rupee.
    pub fn half_rounded(self) -> Self {
        Self(
            (self.0 / Decimal::TWO)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Sum of two amounts, or a validation error when it does not fit.
    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| BookingError::Validation(format!("Amount {self} + {rhs} is out of range")))
    }

    /// Amount in paise, the minor unit Razorpay works with.
    pub fn to_paise(self) -> Result<u64> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|paise| paise.round().to_u64())
            .ok_or_else(|| BookingError::Validation(format!("Amount {self} is out of range")))
    }
}

impl TryFrom<Decimal> for Rupees {
    type Error = BookingError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rupees> for Decimal {
    fn from(value: Rupees) -> Self {
        value.0
    }
}

impl fmt::Display for Rupees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rupees_rejects_negative() {
        assert!(Rupees::new(dec!(0)).is_ok());
        assert!(matches!(
            Rupees::new(dec!(-1)),
            Err(BookingError::Validation(_))
        ));
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let price = Rupees::new(dec!(500)).unwrap();
        let discount = Rupees::new(dec!(700)).unwrap();
        assert_eq!(price.saturating_sub(discount), Rupees::ZERO);
        assert_eq!(
            discount.saturating_sub(price),
            Rupees::new(dec!(200)).unwrap()
        );
    }

    #[test]
    fn test_half_rounded() {
        assert_eq!(
            Rupees::new(dec!(501)).unwrap().half_rounded(),
            Rupees::new(dec!(251)).unwrap()
        );
        assert_eq!(
            Rupees::new(dec!(500)).unwrap().half_rounded(),
            Rupees::new(dec!(250)).unwrap()
        );
    }

    #[test]
    fn test_to_paise() {
        assert_eq!(Rupees::new(dec!(499.5)).unwrap().to_paise().unwrap(), 49950);
        assert_eq!(Rupees::ZERO.to_paise().unwrap(), 0);
    }

    #[test]
    fn test_huge_amounts_are_errors_not_panics() {
        let huge = Rupees::new(Decimal::MAX).unwrap();
        assert!(matches!(huge.to_paise(), Err(BookingError::Validation(_))));
        assert!(matches!(
            huge.checked_add(huge),
            Err(BookingError::Validation(_))
        ));
        assert_eq!(
            Rupees::new(dec!(300)).unwrap().checked_add(Rupees::new(dec!(200)).unwrap()).unwrap(),
            Rupees::new(dec!(500)).unwrap()
        );
    }

    #[test]
    fn test_json_is_a_number() {
        let amount = Rupees::new(dec!(250)).unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "250.0");

        let parsed: Rupees = serde_json::from_str("120").unwrap();
        assert_eq!(parsed, Rupees::new(dec!(120)).unwrap());

        assert!(serde_json::from_str::<Rupees>("-5").is_err());
    }

    #[test]
    fn test_display_drops_trailing_zeros() {
        assert_eq!(Rupees::new(dec!(250.00)).unwrap().to_string(), "250");
    }
}
