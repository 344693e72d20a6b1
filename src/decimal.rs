//! fixed-scale decimal arithmetic for money and rate math.
//!
//! every operation takes its operands as exact decimals (parsed from strings,
//! never routed through `f64`) and returns the result at an explicit scale,
//! rounding half away from zero. division, modulo, roots and powers that have
//! no defined result return `None` instead of panicking; callers must check.
//! `add`, `sub`, `mul` and `sum` panic on overflow like the `Decimal`
//! operators, the `checked_*` forms return `None` instead.

use rust_decimal::prelude::{MathematicalOps, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::errors::{Result, ScheduleError};

/// largest scale a `Decimal` can carry
pub const MAX_SCALE: u32 = 28;

/// scale used for money amounts
pub const MONEY_SCALE: u32 = 2;

/// parse a decimal string exactly, rejecting anything that would need rounding
pub fn parse(input: &str) -> Result<Decimal> {
    Decimal::from_str_exact(input.trim())
        .map_err(|e| ScheduleError::parse(input, e.to_string()))
}

/// round half away from zero to `scale` and pad with trailing zeros
pub fn round(value: Decimal, scale: u32) -> Decimal {
    let scale = scale.min(MAX_SCALE);
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded
}

pub fn add(a: Decimal, b: Decimal, scale: u32) -> Decimal {
    round(a + b, scale)
}

pub fn sub(a: Decimal, b: Decimal, scale: u32) -> Decimal {
    round(a - b, scale)
}

pub fn mul(a: Decimal, b: Decimal, scale: u32) -> Decimal {
    round(a * b, scale)
}

/// `None` on overflow
pub fn checked_add(a: Decimal, b: Decimal, scale: u32) -> Option<Decimal> {
    a.checked_add(b).map(|v| round(v, scale))
}

/// `None` on overflow
pub fn checked_sub(a: Decimal, b: Decimal, scale: u32) -> Option<Decimal> {
    a.checked_sub(b).map(|v| round(v, scale))
}

/// `None` on overflow
pub fn checked_mul(a: Decimal, b: Decimal, scale: u32) -> Option<Decimal> {
    a.checked_mul(b).map(|v| round(v, scale))
}

/// `None` when `b` is zero
pub fn div(a: Decimal, b: Decimal, scale: u32) -> Option<Decimal> {
    a.checked_div(b).map(|q| round(q, scale))
}

/// raise `base` to `exponent`.
///
/// integral exponents are computed exactly by repeated multiplication,
/// fractional ones through `exp(ln(x) * y)`. `None` on overflow or when the
/// result is not a real number.
pub fn pow(base: Decimal, exponent: Decimal, scale: u32) -> Option<Decimal> {
    let result = if exponent.fract().is_zero() {
        base.checked_powi(exponent.to_i64()?)?
    } else {
        if base.is_sign_negative() {
            return None;
        }
        base.checked_powd(exponent)?
    };
    Some(round(result, scale))
}

/// `None` for negative operands
pub fn sqrt(value: Decimal, scale: u32) -> Option<Decimal> {
    value.sqrt().map(|r| round(r, scale))
}

/// remainder with the sign of the dividend, `None` when `modulus` is zero
pub fn rem(value: Decimal, modulus: Decimal) -> Option<Decimal> {
    value.checked_rem(modulus)
}

/// `(base ^ exponent) mod modulus` over integers
///
/// `None` for a zero modulus, a negative exponent, non-integral operands or
/// intermediate overflow.
pub fn powmod(base: Decimal, exponent: Decimal, modulus: Decimal) -> Option<Decimal> {
    if !base.fract().is_zero() || !exponent.fract().is_zero() || !modulus.fract().is_zero() {
        return None;
    }
    let mut exp = exponent.to_u64()?;
    let mut acc = Decimal::ONE.checked_rem(modulus)?;
    let mut factor = base.checked_rem(modulus)?;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.checked_mul(factor)?.checked_rem(modulus)?;
        }
        factor = factor.checked_mul(factor)?.checked_rem(modulus)?;
        exp >>= 1;
    }
    Some(acc.normalize())
}

/// compare two values using only the first `scale` fractional digits
pub fn compare(a: Decimal, b: Decimal, scale: u32) -> Ordering {
    let scale = scale.min(MAX_SCALE);
    let a = a.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    let b = b.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    a.cmp(&b)
}

/// exact sum of many values, rounded once at the end
pub fn sum<I>(values: I, scale: u32) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round(values.into_iter().fold(Decimal::ZERO, |acc, v| acc + v), scale)
}

/// like `sum`, `None` once the running total overflows
pub fn checked_sum<I>(values: I, scale: u32) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .map(|total| round(total, scale))
}

/// arithmetic component with a scale bound at construction.
///
/// replaces a process wide default scale: every instance carries its own, so
/// instances can be shared across threads freely. the `*_dp` variants take an
/// explicit scale and ignore the bound one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalMath {
    scale: u32,
}

impl DecimalMath {
    pub fn new(scale: u32) -> Self {
        Self { scale: scale.min(MAX_SCALE) }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn add(&self, a: Decimal, b: Decimal) -> Decimal {
        add(a, b, self.scale)
    }

    pub fn add_dp(&self, a: Decimal, b: Decimal, scale: u32) -> Decimal {
        add(a, b, scale)
    }

    pub fn sub(&self, a: Decimal, b: Decimal) -> Decimal {
        sub(a, b, self.scale)
    }

    pub fn sub_dp(&self, a: Decimal, b: Decimal, scale: u32) -> Decimal {
        sub(a, b, scale)
    }

    pub fn mul(&self, a: Decimal, b: Decimal) -> Decimal {
        mul(a, b, self.scale)
    }

    pub fn mul_dp(&self, a: Decimal, b: Decimal, scale: u32) -> Decimal {
        mul(a, b, scale)
    }

    pub fn div(&self, a: Decimal, b: Decimal) -> Option<Decimal> {
        div(a, b, self.scale)
    }

    pub fn div_dp(&self, a: Decimal, b: Decimal, scale: u32) -> Option<Decimal> {
        div(a, b, scale)
    }

    pub fn pow(&self, base: Decimal, exponent: Decimal) -> Option<Decimal> {
        pow(base, exponent, self.scale)
    }

    pub fn sqrt(&self, value: Decimal) -> Option<Decimal> {
        sqrt(value, self.scale)
    }

    pub fn rem(&self, value: Decimal, modulus: Decimal) -> Option<Decimal> {
        rem(value, modulus)
    }

    pub fn compare(&self, a: Decimal, b: Decimal) -> Ordering {
        compare(a, b, self.scale)
    }

    pub fn sum<I>(&self, values: I) -> Decimal
    where
        I: IntoIterator<Item = Decimal>,
    {
        sum(values, self.scale)
    }

    /// division that surfaces a zero divisor as an error
    pub fn require_div(&self, a: Decimal, b: Decimal, scale: u32) -> Result<Decimal> {
        div(a, b, scale).ok_or_else(|| ScheduleError::arithmetic(format!("division of {} by zero", a)))
    }

    /// multiplication that surfaces overflow as an error
    pub fn require_mul(&self, a: Decimal, b: Decimal, scale: u32) -> Result<Decimal> {
        checked_mul(a, b, scale)
            .ok_or_else(|| ScheduleError::arithmetic(format!("{} * {} overflowed", a, b)))
    }
}

impl Default for DecimalMath {
    fn default() -> Self {
        Self::new(6)
    }
}

/// money amount held at two decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));

    /// create from decimal, rounding half up to cents
    pub fn from_decimal(d: Decimal) -> Self {
        Money(round(d, MONEY_SCALE))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self> {
        Ok(Money::from_decimal(parse(s)?))
    }

    /// create from integer amount (dollars, yuan, etc)
    pub fn from_major(amount: i64) -> Self {
        Money::from_decimal(Decimal::from(amount))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(add(self.0, other.0, MONEY_SCALE))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = add(self.0, other.0, MONEY_SCALE);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(sub(self.0, other.0, MONEY_SCALE))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = sub(self.0, other.0, MONEY_SCALE);
    }
}

/// annual rate as a plain fraction (0.12 for 12%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    pub fn from_str_exact(s: &str) -> Result<Self> {
        Ok(Rate(parse(s)?))
    }

    /// create from percentage (e.g., 12 for 12%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::ONE_HUNDRED)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}
