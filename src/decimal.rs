// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Exact fixed-point money values.
//!
//! [`FixedPointDecimal`] wraps [`rust_decimal::Decimal`] (96-bit mantissa,
//! scale 0..=28). Nothing here ever passes through binary floating point.
//!
//! Ledger documents store amounts as fractions such as `"1500/100"`; plain
//! decimal literals such as `"15.00"` are accepted as well.
//!
//! # Example
//!
//! ```
//! use ledger_reader_rs::FixedPointDecimal;
//!
//! let value: FixedPointDecimal = "1500/100".parse().unwrap();
//! assert_eq!(value.to_string(), "15.00");
//! assert!((value + (-value)).is_zero());
//! ```

use crate::error::DecimalError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg};
use std::str::FromStr;

const MAX_SCALE: u32 = 28;

/// Signed decimal with exact addition and multiplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FixedPointDecimal(Decimal);

impl FixedPointDecimal {
    /// The additive identity.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Exact `-1` at scale 0, so multiplying by it never changes the scale
    /// of the other operand.
    pub const MINUS_ONE: Self = Self(Decimal::NEGATIVE_ONE);

    /// Returns the additive identity.
    pub fn new() -> Self {
        Self::ZERO
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Strips trailing zeros from the scale without changing the value.
    pub fn normalize(&self) -> Self {
        Self(self.0.normalize())
    }

    /// Exact addition; `None` if the sum overflows or needs more than 28
    /// significant digits.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        let sum = self.0.checked_add(other.0)?;
        if self.is_zero() || other.is_zero() || sum.scale() == self.0.scale().max(other.0.scale()) {
            return Some(Self(sum));
        }
        // Decimal gave up digits to fit the sum. Keep it only if none of them
        // were significant, i.e. it round-trips against both operands.
        let exact = sum.checked_sub(other.0) == Some(self.0) && sum.checked_sub(self.0) == Some(other.0);
        exact.then_some(Self(sum))
    }

    /// Exact multiplication; `None` if the product cannot be held without
    /// rounding or overflow.
    pub fn checked_mul(self, factor: Self) -> Option<Self> {
        let exact_scale = self.0.scale() + factor.0.scale();
        if self.is_zero() || factor.is_zero() {
            return Some(Self(scaled_zero(exact_scale.min(MAX_SCALE))));
        }
        let product = self.0.checked_mul(factor.0)?;
        // Decimal silently drops scale once the exact product no longer fits.
        (product.scale() == exact_scale).then_some(Self(product))
    }

    fn parse_fraction(literal: &str, numerator: &str, denominator: &str) -> Result<Self, DecimalError> {
        let invalid = || DecimalError::Invalid(literal.to_owned());
        let num = Decimal::from_str_exact(numerator.trim()).map_err(|_| invalid())?;
        let den = Decimal::from_str_exact(denominator.trim()).map_err(|_| invalid())?;
        if den.is_zero() {
            return Err(DecimalError::ZeroDenominator(literal.to_owned()));
        }

        // Power-of-ten denominators map straight onto the scale: 1500/100 is 15.00.
        if num.scale() == 0 {
            if let Some(exponent) = power_of_ten_exponent(den) {
                return Decimal::try_from_i128_with_scale(num.mantissa(), exponent)
                    .map(Self)
                    .map_err(|_| DecimalError::Inexact(literal.to_owned()));
            }
        }

        let quotient = num
            .checked_div(den)
            .ok_or_else(|| DecimalError::Inexact(literal.to_owned()))?;
        match quotient.checked_mul(den) {
            Some(back) if back == num => Ok(Self(quotient)),
            _ => Err(DecimalError::Inexact(literal.to_owned())),
        }
    }
}

fn scaled_zero(scale: u32) -> Decimal {
    let mut zero = Decimal::ZERO;
    zero.rescale(scale);
    zero
}

/// Returns `k` when `value == 10^k` and `k` fits a decimal scale.
fn power_of_ten_exponent(value: Decimal) -> Option<u32> {
    if value.scale() != 0 || value.is_sign_negative() {
        return None;
    }
    let mut mantissa = value.mantissa();
    let mut exponent = 0;
    while mantissa > 1 && mantissa % 10 == 0 {
        mantissa /= 10;
        exponent += 1;
    }
    (mantissa == 1 && exponent <= MAX_SCALE).then_some(exponent)
}

impl FromStr for FixedPointDecimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        match literal.split_once('/') {
            Some((numerator, denominator)) => Self::parse_fraction(literal, numerator, denominator),
            None => Decimal::from_str_exact(literal)
                .map(Self)
                .map_err(|_| DecimalError::Invalid(literal.to_owned())),
        }
    }
}

impl TryFrom<String> for FixedPointDecimal {
    type Error = DecimalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FixedPointDecimal> for String {
    fn from(value: FixedPointDecimal) -> Self {
        value.to_string()
    }
}

impl From<Decimal> for FixedPointDecimal {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for FixedPointDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for FixedPointDecimal {
    type Output = Self;

    /// Rounds like [`Decimal`] once the sum needs more than 28 significant
    /// digits. Use [`FixedPointDecimal::checked_add`] where exactness matters.
    ///
    /// # Panics
    ///
    /// On overflow, like [`Decimal`]'s own operator.
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Mul for FixedPointDecimal {
    type Output = Self;

    /// Zero products keep the scale of the operands, so `x * MINUS_ONE`
    /// matches `-x` digit for digit.
    ///
    /// Exact only when the product fits 28 significant digits, as it always
    /// does for `MINUS_ONE`. Other products round like [`Decimal`]; use
    /// [`FixedPointDecimal::checked_mul`] to reject them instead.
    ///
    /// # Panics
    ///
    /// On overflow, like [`Decimal`]'s own operator.
    fn mul(self, factor: Self) -> Self {
        if self.is_zero() || factor.is_zero() {
            return Self(scaled_zero((self.0.scale() + factor.0.scale()).min(MAX_SCALE)));
        }
        Self(self.0 * factor.0)
    }
}

impl Neg for FixedPointDecimal {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Folds with `+`, so it rounds and panics like [`Add`]. Balances are summed
/// with [`FixedPointDecimal::checked_add`] instead.
impl Sum for FixedPointDecimal {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a FixedPointDecimal> for FixedPointDecimal {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
