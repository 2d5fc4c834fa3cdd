//! # Money Module
//!
//! Provides the `Money` type used for the earnings total.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  The remote profile row and the local store both hold the total as a   │
//! │  decimal number. We convert to integer cents at the boundary and do    │
//! │  all arithmetic on i64.                                                │
//! │                                                                         │
//! │    wire 12.5  ──from_decimal──►  1250 cents  ──to_decimal──►  12.5     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use nabil_core::money::Money;
//!
//! let earned = Money::from_cents(1099);
//! let total = earned + Money::from_cents(500);
//! assert_eq!(total.to_string(), "15.99");
//!
//! let parsed = Money::parse_decimal("125.5").unwrap();
//! assert_eq!(parsed.cents(), 12550);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: refunds can push a running total down
/// - **Serialized as cents**: the decimal form only exists at storage edges
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Converts a decimal amount (as stored remotely) to money.
    ///
    /// Rounds half away from zero to the nearest cent. Non-finite values
    /// are rejected.
    ///
    /// ## Example
    /// ```rust
    /// use nabil_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(10.996).unwrap().cents(), 1100);
    /// assert!(Money::from_decimal(f64::NAN).is_err());
    /// ```
    pub fn from_decimal(amount: f64) -> CoreResult<Self> {
        if !amount.is_finite() {
            return Err(CoreError::InvalidAmount {
                value: amount.to_string(),
                reason: "not a finite number".to_string(),
            });
        }
        let cents = (amount * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return Err(CoreError::InvalidAmount {
                value: amount.to_string(),
                reason: "out of range".to_string(),
            });
        }
        Ok(Money(cents as i64))
    }

    /// Parses the decimal string form used in local storage.
    pub fn parse_decimal(raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();
        let amount: f64 = trimmed.parse().map_err(|_| CoreError::InvalidAmount {
            value: raw.to_string(),
            reason: "not a decimal number".to_string(),
        })?;
        Money::from_decimal(amount)
    }

    /// Decimal form for the remote wire and local storage.
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    /// Formats as `major.minor` with two decimals, e.g. `-5.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
