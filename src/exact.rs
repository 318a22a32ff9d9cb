// SPDX-License-Identifier: BSD-2-Clause

//! Exact-arithmetic helpers.
//!
//! All intermediate arithmetic in this crate happens on [`BigRational`]
//! values, so every add/subtract/multiply/divide/compare is exact regardless
//! of magnitude; the operator impls come straight from `num-rational`. This
//! module holds the pieces `Ratio` does not provide: powers of two, binary
//! magnitude estimation, and the guard/round/sticky split of an exact value
//! against a target mantissa width.

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, Signed};

/// `2^exp` as an exact rational, for any sign of `exp`.
pub fn pow2(exp: i64) -> BigRational {
    if exp >= 0 {
        BigRational::from(BigInt::one() << exp as usize)
    } else {
        BigRational::new(BigInt::one(), BigInt::one() << (-exp) as usize)
    }
}

/// Largest `e` with `2^e <= value`. Requires `value > 0`.
pub fn floor_log2(value: &BigRational) -> i64 {
    debug_assert!(value.is_positive());
    let numer_bits = value.numer().bits() as i64;
    let denom_bits = value.denom().bits() as i64;
    // n/d with n of a bits and d of b bits lies in (2^(a-b-1), 2^(a-b+1)),
    // so the floor is a-b or a-b-1.
    let mut estimate = numer_bits - denom_bits;
    if pow2(estimate) > *value {
        estimate -= 1;
    }
    debug_assert!(pow2(estimate) <= *value && *value < pow2(estimate + 1));
    estimate
}

/// An exact magnitude split against a mantissa width: the integer significand
/// in units of one ULP plus the first two discarded bits and the OR of all
/// the rest.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SignificandParts {
    pub mantissa: BigUint,
    pub guard: bool,
    pub round: bool,
    pub sticky: bool,
}

impl SignificandParts {
    /// True when discarding guard/round/sticky loses information.
    pub fn is_inexact(&self) -> bool {
        self.guard || self.round || self.sticky
    }
}

/// Split `magnitude > 0` relative to an unbiased `exponent`, where one ULP is
/// `2^(exponent - fraction_width)`.
///
/// For a normal value `exponent` is `floor_log2(magnitude)` and the mantissa
/// comes out with `fraction_width + 1` bits; pinning `exponent` to the
/// format's minimum instead yields the subnormal significand.
pub fn significand_parts(
    magnitude: &BigRational,
    exponent: i64,
    fraction_width: u32,
) -> SignificandParts {
    debug_assert!(magnitude.is_positive());
    // Two extra low bits hold guard and round; everything below them ORs
    // into sticky via the fractional remainder.
    let scaled = magnitude * pow2(fraction_width as i64 + 2 - exponent);
    let sticky = !scaled.is_integer();
    let whole = scaled
        .to_integer()
        .to_biguint()
        .expect("positive by construction");
    SignificandParts {
        guard: whole.bit(1),
        round: whole.bit(0),
        sticky,
        mantissa: whole >> 2usize,
    }
}

/// Rebuild the exact magnitude `mantissa * 2^(exponent - fraction_width)`.
pub fn significand_value(mantissa: &BigUint, exponent: i64, fraction_width: u32) -> BigRational {
    BigRational::from(BigInt::from(mantissa.clone())) * pow2(exponent - fraction_width as i64)
}
