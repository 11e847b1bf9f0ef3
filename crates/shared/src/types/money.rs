//! Monetary amounts stored as `NUMERIC(10,2)`.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` and enforces the column precision
//! at construction time, so a `Money` value always fits the database.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Total number of significant digits a stored amount may have.
pub const MAX_DIGITS: u32 = 10;

/// Number of fractional digits a stored amount may have.
pub const DECIMAL_PLACES: u32 = 2;

/// Reasons an amount does not fit `NUMERIC(10,2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// More than two fractional digits.
    #[error("Ensure that there are no more than {DECIMAL_PLACES} decimal places.")]
    TooManyDecimalPlaces,

    /// Integer part too large.
    #[error("Ensure that there are no more than {MAX_DIGITS} digits in total.")]
    TooManyDigits,
}

/// A signed amount with exactly two decimal places.
///
/// Balances are always non-negative, but deltas and transaction amounts carry
/// a sign, so the type itself allows negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Zero, rendered as `0.00`.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, DECIMAL_PLACES));

    /// Validates `amount` against the column precision and rescales it to two
    /// decimal places.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError` if the amount has more than two significant
    /// fractional digits or ten digits in total.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        let normalized = amount.normalize();
        if normalized.scale() > DECIMAL_PLACES {
            return Err(MoneyError::TooManyDecimalPlaces);
        }
        if normalized.abs() >= upper_bound() {
            return Err(MoneyError::TooManyDigits);
        }

        let mut value = normalized;
        value.rescale(DECIMAL_PLACES);
        Ok(Self(value))
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly negative.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Adds a signed delta, re-validating the precision of the result.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooManyDigits` when the sum no longer fits.
    pub fn checked_add(self, delta: Self) -> Result<Self, MoneyError> {
        let sum = self
            .0
            .checked_add(delta.0)
            .ok_or(MoneyError::TooManyDigits)?;
        Self::new(sum)
    }
}

/// 10^(MAX_DIGITS - DECIMAL_PLACES)
fn upper_bound() -> Decimal {
    Decimal::from(10_i64.pow(MAX_DIGITS - DECIMAL_PLACES))
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
