//! Item quantities and their coercion from user input.

use core::fmt;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ValueObject};

/// Non-negative unit count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl ValueObject for Quantity {}

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);
    pub const ONE: Quantity = Quantity(1);

    pub fn new(count: u32) -> Self {
        Self(count)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Coerce form text into a quantity.
    ///
    /// Accepts any finite, non-negative, integral numeric literal (`"3"`,
    /// `" 3.0 "`, `"1e2"`). Empty input, fractions, negatives and values that
    /// do not fit a `u32` are rejected.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("quantity is required"));
        }
        if let Ok(n) = trimmed.parse::<u32>() {
            return Ok(Self(n));
        }
        let n: f64 = trimmed
            .parse()
            .map_err(|_| DomainError::validation(format!("quantity '{trimmed}' is not a number")))?;
        Self::from_number(n)
    }

    /// Coerce a JSON-style number into a quantity.
    pub fn from_number(n: f64) -> DomainResult<Self> {
        if !n.is_finite() {
            return Err(DomainError::validation("quantity must be finite"));
        }
        if n < 0.0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if n.fract() != 0.0 {
            return Err(DomainError::validation("quantity must be a whole number"));
        }
        if n > f64::from(u32::MAX) {
            return Err(DomainError::validation("quantity is too large"));
        }
        Ok(Self(n as u32))
    }

    /// Like [`Quantity::parse`] but additionally rejects zero.
    pub fn parse_positive(input: &str) -> DomainResult<Self> {
        Self::parse(input)?.ensure_positive()
    }

    pub fn ensure_positive(self) -> DomainResult<Self> {
        if self.is_zero() {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        Ok(self)
    }

    pub fn checked_add(self, other: Quantity) -> DomainResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| DomainError::invariant("quantity overflow"))
    }

    /// One unit fewer, saturating at zero.
    pub fn decremented(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_numeric_literals() {
        assert_eq!(Quantity::parse("3").unwrap().get(), 3);
        assert_eq!(Quantity::parse(" 7 ").unwrap().get(), 7);
        assert_eq!(Quantity::parse("3.0").unwrap().get(), 3);
        assert_eq!(Quantity::parse("1e2").unwrap().get(), 100);
        assert_eq!(Quantity::parse("0").unwrap(), Quantity::ZERO);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "   ", "abc", "2.5", "-1", "inf", "NaN", "5000000000"] {
            let err = Quantity::parse(bad).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{bad:?} -> {err:?}");
        }
    }

    #[test]
    fn positive_parse_rejects_zero() {
        assert!(Quantity::parse_positive("0").is_err());
        assert_eq!(Quantity::parse_positive("2").unwrap().get(), 2);
    }

    #[test]
    fn accumulation_overflow_is_an_invariant_violation() {
        let err = Quantity::new(u32::MAX).checked_add(Quantity::ONE).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn decrement_saturates() {
        assert_eq!(Quantity::ZERO.decremented(), Quantity::ZERO);
        assert_eq!(Quantity::new(4).decremented().get(), 3);
    }
}
