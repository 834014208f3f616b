//! Money value object for prices and ledger amounts.
//!
//! Amounts are decimal, never floating point, and never negative in this
//! domain. Rounding is round-half-up to currency minor-unit precision
//! (2 decimals), matching what the payment gateway bills.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Percentage, ValidationError};

/// Non-negative monetary amount in major currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a Money value, returning error if negative.
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        if amount.is_sign_negative() {
            return Err(ValidationError::invalid_format(
                "amount",
                format!("must not be negative, got {}", amount),
            ));
        }
        Ok(Self(amount))
    }

    /// Creates a Money value from whole major units (e.g. dollars).
    pub fn from_major(major: u64) -> Self {
        Self(Decimal::from(major))
    }

    /// Returns the inner decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Rounds to 2 decimal places using round-half-up.
    pub fn round_to_cents(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Returns the amount in minor currency units (cents), rounded half-up.
    ///
    /// This is the representation the payment gateway expects for
    /// `unit_amount` fields.
    pub fn minor_units(&self) -> i64 {
        (self.round_to_cents().0 * Decimal::from(100))
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// Applies a percentage discount, rounding the result half-up to cents.
    ///
    /// `100 − 20% → 80.00`; the computation is `amount − discount/100 × amount`.
    pub fn apply_discount(&self, discount: Percentage) -> Self {
        let off = self.0 * Decimal::from(discount.value()) / Decimal::from(100);
        Self(self.0 - off).round_to_cents()
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.round_to_cents().0)
    }
}
