// SPDX-License-Identifier: BSD-2-Clause

//! Rounding policies.

use crate::exact::SignificandParts;
use crate::value::Sign;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;

/// The selectable IEEE 754 rounding-direction attributes.
///
/// A small closed enum dispatched at runtime; rounding keeps no state of its
/// own.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RoundingMode {
    /// Round to nearest, ties to the even significand.
    NearestEven,
    /// Truncate toward zero.
    TowardZero,
    /// Round toward +∞.
    TowardPositive,
    /// Round toward −∞.
    TowardNegative,
}

impl Default for RoundingMode {
    fn default() -> Self {
        RoundingMode::NearestEven
    }
}

impl RoundingMode {
    /// Whether a magnitude with discarded bits rounds away from zero.
    fn rounds_up(self, parts: &SignificandParts, sign: Sign) -> bool {
        match self {
            RoundingMode::NearestEven => {
                parts.guard && (parts.round || parts.sticky || parts.mantissa.is_odd())
            }
            RoundingMode::TowardZero => false,
            RoundingMode::TowardPositive => sign == Sign::Positive && parts.is_inexact(),
            RoundingMode::TowardNegative => sign == Sign::Negative && parts.is_inexact(),
        }
    }
}

/// A correctly rounded significand plus the exponent it ended up at.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Rounded {
    pub mantissa: BigUint,
    pub exponent: i64,
    pub inexact: bool,
}

/// Apply `mode` to an exact significand split.
///
/// `exponent` is the unbiased exponent the split was taken at. A carry out of
/// the significand width is renormalized here: the mantissa drops back to the
/// minimum normal form and the exponent increments. The caller is left to
/// check the returned exponent against the format's range.
pub fn round_significand(
    parts: SignificandParts,
    exponent: i64,
    sign: Sign,
    mode: RoundingMode,
    fraction_width: u32,
) -> Rounded {
    let inexact = parts.is_inexact();
    let round_up = mode.rounds_up(&parts, sign);
    let mut mantissa = parts.mantissa;
    let mut exponent = exponent;
    if round_up {
        mantissa += BigUint::one();
        // Carry past fraction_width + 1 bits: 1.11..1 became 10.00..0.
        if mantissa.bits() > fraction_width as u64 + 1 {
            mantissa >>= 1usize;
            exponent += 1;
        }
    }
    Rounded {
        mantissa,
        exponent,
        inexact,
    }
}
