use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::BigInt;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of decimal places between minor and major currency units.
const MINOR_DIGITS: i64 = 2;

#[derive(Debug, Clone, Copy, Default)]
/// A monetary value held in minor currency units (cents).
///
/// Balances and transaction amounts are persisted as integers, so every
/// computation stays exact. Only the display goes through `BigDecimal`, which
/// shifts the value two places to the major unit.
///
/// # Examples
/// ```
/// use transaction_ledger::common::money::Money;
///
/// let amount = Money::new(1500);
/// assert_eq!(amount.as_i64(), 1500);
/// assert_eq!(amount.to_string(), "15.00");
/// ```
pub struct Money(i64);

impl Money {
    pub fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    pub fn zero() -> Self {
        Money(0)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Absolute value, saturating at `i64::MAX` for `i64::MIN`.
    pub fn abs(&self) -> Money {
        Money(self.0.saturating_abs())
    }

    /// Value in major units, e.g. `15.00` for 1500 cents.
    pub fn to_major(&self) -> BigDecimal {
        BigDecimal::new(BigInt::from(self.0), MINOR_DIGITS)
    }

    pub fn to_string_2dp(&self) -> String {
        format!("{:.2}", self.to_major())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_2dp())
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for Money {}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
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

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
