//! # Money and Weight
//!
//! Integer amounts for everything the checkout adds up.
//! Money is held in the smallest currency unit (piastres, 1/100 of the
//! display unit) and weights in grams, so subtotals and shipping fees are
//! exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Minor units per major unit
const MINOR_PER_MAJOR: i64 = 100;

/// Grams per kilogram
const GRAMS_PER_KG: u64 = 1_000;

/// Default shipping rate, in major units per kilogram
pub const SHIPPING_RATE_PER_KG: i64 = 10;

/// Monetary amount in the smallest currency unit
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create from the smallest unit (piastres)
    pub const fn from_minor(amount: i64) -> Self {
        Self(amount)
    }

    /// Create from whole display units
    pub const fn from_major(amount: i64) -> Self {
        Self(amount * MINOR_PER_MAJOR)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// Amount in the smallest unit
    pub const fn minor(&self) -> i64 {
        self.0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `None` when the sum leaves the `i64` range
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// `None` when the product leaves the `i64` range
    pub fn checked_mul(self, rhs: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(rhs)).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR as u64;
        write!(f, "{}{}.{:02}", sign, abs / per, abs % per)
    }
}

/// Error parsing a display amount such as "6000" or "15.50"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid amount '{0}': expected a number with at most two decimals")]
pub struct ParseMoneyError(String);

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Parse major units with up to two decimals
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoneyError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (major, minor) = digits.split_once('.').unwrap_or((digits, ""));
        if major.is_empty()
            || minor.len() > 2
            || !major.bytes().all(|b| b.is_ascii_digit())
            || !minor.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }

        let major: i64 = major.parse().map_err(|_| err())?;
        let minor: i64 = format!("{:0<2}", minor).parse().map_err(|_| err())?;
        let amount = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(minor))
            .ok_or_else(err)?;
        Ok(Money(if negative { -amount } else { amount }))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
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

/// Shipping weight, always positive, stored in grams.
///
/// Serialized as kilograms so catalogs read naturally (`weight_kg = 1.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Weight(u32);

impl Weight {
    /// Create from grams. Returns `None` for zero.
    pub const fn from_grams(grams: u32) -> Option<Self> {
        if grams == 0 {
            None
        } else {
            Some(Self(grams))
        }
    }

    /// Create from kilograms, rounded to the nearest gram.
    /// Returns `None` unless the result is a positive, representable weight.
    pub fn from_kg(kg: f64) -> Option<Self> {
        if !kg.is_finite() || kg <= 0.0 {
            return None;
        }
        let grams = (kg * GRAMS_PER_KG as f64).round();
        if grams < 1.0 || grams > f64::from(u32::MAX) {
            return None;
        }
        Self::from_grams(grams as u32)
    }

    /// `grams` must be non-zero
    pub(crate) const fn nonzero_grams(grams: u32) -> Self {
        Self(grams)
    }

    pub const fn grams(&self) -> u32 {
        self.0
    }

    pub fn as_kg(&self) -> f64 {
        f64::from(self.0) / GRAMS_PER_KG as f64
    }
}

impl TryFrom<f64> for Weight {
    type Error = String;

    fn try_from(kg: f64) -> Result<Self, Self::Error> {
        Weight::from_kg(kg).ok_or_else(|| format!("weight must be a positive number of kg, got {kg}"))
    }
}

impl From<Weight> for f64 {
    fn from(weight: Weight) -> f64 {
        weight.as_kg()
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = u64::from(self.0) / GRAMS_PER_KG;
        let frac = u64::from(self.0) % GRAMS_PER_KG;
        if frac == 0 {
            return write!(f, "{} kg", whole);
        }
        let digits = format!("{:03}", frac);
        write!(f, "{}.{} kg", whole, digits.trim_end_matches('0'))
    }
}

/// How shipping fees are charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// Fee per kilogram shipped
    pub rate_per_kg: Money,

    /// When false, a shippable line item is charged for one unit's weight
    /// regardless of its quantity. When true, weight is multiplied by
    /// quantity.
    #[serde(default)]
    pub charge_per_unit: bool,
}

impl ShippingPolicy {
    pub fn new(rate_per_kg: Money) -> Self {
        Self {
            rate_per_kg,
            charge_per_unit: false,
        }
    }

    /// Builder: charge every unit's weight
    pub fn per_unit(mut self) -> Self {
        self.charge_per_unit = true;
        self
    }

    /// Fee for one shippable line item, rounded half-up to the minor unit.
    /// `None` when the fee does not fit in `Money`.
    pub fn fee_for(&self, weight: Weight, quantity: u32) -> Option<Money> {
        let units = if self.charge_per_unit { quantity } else { 1 };
        let grams = i128::from(weight.grams()) * i128::from(units);
        let scaled = grams.checked_mul(i128::from(self.rate_per_kg.minor()))?;
        let per_kg = i128::from(GRAMS_PER_KG);
        let rounded = scaled.checked_add(per_kg / 2)?.div_euclid(per_kg);
        i64::try_from(rounded).ok().map(Money::from_minor)
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self::new(Money::from_major(SHIPPING_RATE_PER_KG))
    }
}
