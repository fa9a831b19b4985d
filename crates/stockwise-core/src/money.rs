//! # Money Module
//!
//! Provides the `Money` type for monetary values in integer cents.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale.totalAmount = Σ SaleItem.subtotal − Sale.discountAmount           │
//! │                                                                         │
//! │  With floats, 3 × 0.10 − 0.30 = 5.55e-17, and the invariant above       │
//! │  cannot be checked with `==`. With cents it is exact:                   │
//! │                                                                         │
//! │    3 × 10 − 30 = 0                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockwise_core::money::Money;
//!
//! let unit = Money::from_cents(500);          // $5.00
//! let line = unit.multiply_quantity(2);       // $10.00
//! let off = line.percentage_of(1000);         // 10% → $1.00
//! assert_eq!((line - off).cents(), 900);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Basis points in 100%.
pub const BPS_SCALE: i64 = 10_000;

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so that stock adjustments and corrections can be expressed,
/// although every persisted sale amount is non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use stockwise_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ```rust
    /// use stockwise_core::money::Money;
    ///
    /// let line = Money::from_cents(299).multiply_quantity(3);
    /// assert_eq!(line.cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Like [`multiply_quantity`](Self::multiply_quantity), but `None` on
    /// overflow. Use this for amounts derived from request input.
    ///
    /// ```rust
    /// use stockwise_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(299).checked_multiply_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX / 2).checked_multiply_quantity(3), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns `bps` basis points of this amount, rounded half-up.
    ///
    /// 1000 bps = 10%. Uses i128 internally so large totals cannot overflow.
    ///
    /// ```rust
    /// use stockwise_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(2000).percentage_of(1000).cents(), 200);
    /// assert_eq!(Money::from_cents(999).percentage_of(1250).cents(), 125);
    /// ```
    pub fn percentage_of(&self, bps: u32) -> Money {
        let half = (BPS_SCALE / 2) as i128;
        let amount = (self.0 as i128 * bps as i128 + half) / BPS_SCALE as i128;
        Money(amount as i64)
    }

    /// Returns the tax portion already contained in this (tax-inclusive) amount.
    ///
    /// ```rust
    /// use stockwise_core::money::Money;
    ///
    /// // $11.00 at 10% inclusive contains $1.00 tax
    /// assert_eq!(Money::from_cents(1100).included_tax(1000).cents(), 100);
    /// assert!(Money::from_cents(1100).included_tax(0).is_zero());
    /// ```
    pub fn included_tax(&self, bps: u32) -> Money {
        if bps == 0 {
            return Money::zero();
        }
        let scale = BPS_SCALE as i128;
        let denominator = scale + bps as i128;
        let net = (self.0 as i128 * scale + denominator / 2) / denominator;
        Money(self.0 - net as i64)
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
