//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Fixed-Point at 1/10,000?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Unit costs are derived, never typed in:                               │
//! │    cost = invoice_total / qty, kept to FOUR decimal places so that     │
//! │    $100.00 / 3 units = $33.3333/unit survives storage exactly          │
//! │                                                                         │
//! │  OUR SOLUTION: i64 at scale 10,000                                      │
//! │    1 currency unit   = 10_000                                           │
//! │    $33.3333          = 333_333                                          │
//! │    Cents, whole units and 4-decimal costs all live in one integer      │
//! │    representation; rounding happens exactly once, where we say so      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billar_core::money::Money;
//!
//! // Create from whole currency units (preferred for prices)
//! let price = Money::from_units(1500); // $1500
//!
//! // Derived unit cost: $100 invoice over 3 units
//! let cost = Money::unit_cost(Money::from_units(100), 3);
//! assert_eq!(cost.scaled(), 333_333); // $33.3333 exactly
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

/// Scaled sub-units per whole currency unit.
///
/// 10,000 gives four decimal places, the precision unit costs are
/// rounded to when derived from an invoice total.
pub const SCALE: i64 = 10_000;

// =============================================================================
// Rounding
// =============================================================================

/// Divides rounding half to even (Bankers Rounding).
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  BANKERS ROUNDING (Round Half to Even)                              │
/// │                                                                     │
/// │  Standard rounding always rounds 0.5 UP, causing systematic bias:  │
/// │    0.5 → 1, 1.5 → 2, 2.5 → 3, 3.5 → 4 (always up = +bias)          │
/// │                                                                     │
/// │  Bankers Rounding rounds 0.5 to nearest EVEN number:                │
/// │    0.5 → 0, 1.5 → 2, 2.5 → 2, 3.5 → 4 (alternates = no bias)       │
/// │                                                                     │
/// │  Every derived figure in the system (unit costs, sale totals,      │
/// │  tax-inclusive lines) rounds through this one function.            │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Works for negative numerators: -1.5 rounds to -2, -2.5 rounds to -2.
/// `denom` must be positive.
fn div_round_half_even(numer: i128, denom: i128) -> i128 {
    debug_assert!(denom > 0);
    let quot = numer.div_euclid(denom);
    let rem = numer.rem_euclid(denom);
    let twice = rem * 2;
    if twice > denom || (twice == denom && quot % 2 != 0) {
        quot + 1
    } else {
        quot
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value stored as an i64 at 1/10,000 of a currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic intermediate values may dip negative
/// - **Scale 10,000**: unit costs carry four decimals exactly
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent sqlx Type**: binds and decodes as a plain INTEGER column
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  invoice_total ──► unit_cost (round ÷4dp) ──► product.cost              │
/// │                                                                         │
/// │  product.price ──► sale_total (round ×2dp) ──► sale.total               │
/// │                                                                         │
/// │  stock × cost / price ──► inventory valuations ──► grouped() display    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use billar_core::money::Money;
    ///
    /// let price = Money::from_units(1500); // $1500
    /// assert_eq!(price.scaled(), 15_000_000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * SCALE)
    }

    /// Creates a Money value from cents (1/100 of a unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents * 100)
    }

    /// Creates a Money value from raw scaled sub-units (1/10,000 of a unit).
    ///
    /// This is the storage representation; the database holds exactly
    /// this integer.
    #[inline]
    pub const fn from_scaled(scaled: i64) -> Self {
        Money(scaled)
    }

    /// Returns the raw scaled value (1/10,000 of a unit).
    #[inline]
    pub const fn scaled(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Derives a per-unit cost from an invoice total: `round(total / qty, 4)`.
    ///
    /// Unit cost is *always* computed this way, never entered directly, so
    /// every recorded cost traces back to a real invoice amount. Because the
    /// scale is already 1/10,000, one half-even division yields the
    /// four-decimal result exactly.
    ///
    /// ## Example
    /// ```rust
    /// use billar_core::money::Money;
    ///
    /// // $100.00 invoice over 3 units = $33.3333/unit
    /// let cost = Money::unit_cost(Money::from_units(100), 3);
    /// assert_eq!(cost.scaled(), 333_333);
    /// ```
    ///
    /// ## Panics
    /// Panics if `qty == 0`. Callers validate quantity before deriving.
    #[inline]
    pub fn unit_cost(total: Money, qty: i64) -> Money {
        Money(div_round_half_even(total.0 as i128, qty as i128) as i64)
    }

    /// Computes a sale total: `round(price × qty, 2)`.
    ///
    /// The charged amount is rounded to the cent even when the price carries
    /// four decimals, matching what the customer actually pays.
    pub fn sale_total(price: Money, qty: i64) -> Money {
        let raw = price.0 as i128 * qty as i128;
        Money((div_round_half_even(raw, 100) * 100) as i64)
    }

    /// Multiplies by a quantity without rounding.
    ///
    /// ## Example
    /// ```rust
    /// use billar_core::money::Money;
    ///
    /// let unit_cost = Money::from_scaled(333_333); // $33.3333
    /// assert_eq!(unit_cost.times(3).scaled(), 999_999); // $99.9999
    /// ```
    #[inline]
    pub const fn times(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Rounds to the nearest cent, half to even.
    pub fn round_to_cents(&self) -> Money {
        Money((div_round_half_even(self.0 as i128, 100) * 100) as i64)
    }

    /// Rounds to the nearest whole currency unit, half to even.
    pub fn round_to_units(&self) -> i64 {
        div_round_half_even(self.0 as i128, SCALE as i128) as i64
    }

    /// Computes the tax portion for a rate, half-even rounded to the
    /// smallest stored sub-unit.
    pub fn tax_amount(&self, rate: TaxRate) -> Money {
        Money(div_round_half_even(self.0 as i128 * rate.bps() as i128, 10_000) as i64)
    }

    /// Returns this amount with tax added: `amount × (1 + rate)`.
    ///
    /// Computed in one shot so the result rounds exactly once.
    pub fn with_tax(&self, rate: TaxRate) -> Money {
        let scaled = div_round_half_even(
            self.0 as i128 * (10_000 + rate.bps() as i128),
            10_000,
        );
        Money(scaled as i64)
    }

    /// Formats as a whole-unit amount with dot thousands separators and
    /// no decimals: 1234567 units renders as `"1.234.567"`.
    ///
    /// This is the register/receipt currency style; sub-unit precision is
    /// rounded away (half to even) before grouping.
    pub fn grouped(&self) -> String {
        let units = self.round_to_units();
        let digits = units.abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if units < 0 {
            out.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(ch);
        }
        out
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// Two decimals when the value is cent-aligned, four when a derived cost
/// carries sub-cent precision. For register documents use
/// [`Money::grouped`] instead.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let units = (self.0 / SCALE).abs();
        let frac = (self.0 % SCALE).abs();
        if frac % 100 == 0 {
            write!(f, "{}${}.{:02}", sign, units, frac / 100)
        } else {
            write!(f, "{}${}.{:04}", sign, units, frac)
        }
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summation for valuation totals.
impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
