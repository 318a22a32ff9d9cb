// SPDX-License-Identifier: BSD-2-Clause

//! The exact-then-round arithmetic pipeline.

use crate::exact;
use crate::format::{FormatSpec, Precision};
use crate::rounding::{self, RoundingMode};
use crate::session::{ExceptionFlags, Session};
use crate::value::{FiniteClass, FloatValue, Sign};
use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;

/// Performs the basic operations over [`FloatValue`] operands.
///
/// Every operation runs the same pipeline: special-case dispatch on the
/// operand classifications, then an exact rational computation, then a single
/// rounding step against the active precision (skipped entirely in infinite
/// mode), accumulating exception flags into the caller's [`Session`].
///
/// The engine itself is immutable and `Copy`; all mutable state lives on the
/// session.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArithmeticEngine {
    precision: Precision,
    rounding: RoundingMode,
}

impl ArithmeticEngine {
    pub fn new(precision: Precision, rounding: RoundingMode) -> Self {
        Self {
            precision,
            rounding,
        }
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    #[inline]
    pub fn rounding_mode(&self) -> RoundingMode {
        self.rounding
    }

    pub fn add(&self, lhs: &FloatValue, rhs: &FloatValue, session: &mut Session) -> FloatValue {
        self.add_or_sub(lhs, rhs, session, false)
    }

    pub fn sub(&self, lhs: &FloatValue, rhs: &FloatValue, session: &mut Session) -> FloatValue {
        self.add_or_sub(lhs, rhs, session, true)
    }

    fn add_or_sub(
        &self,
        lhs: &FloatValue,
        rhs: &FloatValue,
        session: &mut Session,
        is_sub: bool,
    ) -> FloatValue {
        if lhs.is_nan() || rhs.is_nan() {
            return propagate_nan(lhs, rhs, session);
        }
        // Subtraction is addition of the negated right operand.
        let rhs = if is_sub { rhs.neg() } else { rhs.clone() };
        match (lhs, &rhs) {
            (FloatValue::Infinity { sign: lhs_sign }, FloatValue::Infinity { sign: rhs_sign }) => {
                if lhs_sign == rhs_sign {
                    FloatValue::infinity(*lhs_sign)
                } else {
                    invalid_operation(session)
                }
            }
            (FloatValue::Infinity { sign }, _) | (_, FloatValue::Infinity { sign }) => {
                FloatValue::infinity(*sign)
            }
            (FloatValue::Zero { sign: lhs_sign }, FloatValue::Zero { sign: rhs_sign }) => {
                if lhs_sign == rhs_sign {
                    FloatValue::zero(*lhs_sign)
                } else {
                    FloatValue::zero(self.exact_cancellation_sign())
                }
            }
            // Zero-plus-finite falls through: the sum is the other operand's
            // exact rational, which still has to go through the rounding step
            // in case it was never rounded into this format.
            _ => {
                let sum = lhs.to_rational().expect("known to be finite")
                    + rhs.to_rational().expect("known to be finite");
                if sum.is_zero() {
                    FloatValue::zero(self.exact_cancellation_sign())
                } else {
                    self.round_result(Sign::of_rational(&sum), sum.abs(), session)
                }
            }
        }
    }

    pub fn mul(&self, lhs: &FloatValue, rhs: &FloatValue, session: &mut Session) -> FloatValue {
        if lhs.is_nan() || rhs.is_nan() {
            return propagate_nan(lhs, rhs, session);
        }
        let sign = lhs.sign() * rhs.sign();
        if (lhs.is_infinity() && rhs.is_zero()) || (lhs.is_zero() && rhs.is_infinity()) {
            invalid_operation(session)
        } else if lhs.is_zero() || rhs.is_zero() {
            FloatValue::zero(sign)
        } else if lhs.is_infinity() || rhs.is_infinity() {
            FloatValue::infinity(sign)
        } else {
            let product = lhs.to_rational().expect("known to be finite")
                * rhs.to_rational().expect("known to be finite");
            self.round_result(sign, product.abs(), session)
        }
    }

    pub fn div(&self, lhs: &FloatValue, rhs: &FloatValue, session: &mut Session) -> FloatValue {
        if lhs.is_nan() || rhs.is_nan() {
            return propagate_nan(lhs, rhs, session);
        }
        let sign = lhs.sign() * rhs.sign();
        if (lhs.is_infinity() && rhs.is_infinity()) || (lhs.is_zero() && rhs.is_zero()) {
            invalid_operation(session)
        } else if lhs.is_zero() || rhs.is_infinity() {
            FloatValue::zero(sign)
        } else if lhs.is_infinity() {
            FloatValue::infinity(sign)
        } else if rhs.is_zero() {
            session.raise(ExceptionFlags::DIVISION_BY_ZERO);
            FloatValue::infinity(sign)
        } else {
            let quotient = lhs.to_rational().expect("known to be finite")
                / rhs.to_rational().expect("known to be finite");
            self.round_result(sign, quotient.abs(), session)
        }
    }

    /// Compare two values; `None` means unordered.
    ///
    /// An ordered comparison raises `INVALID_OPERATION` for any NaN operand;
    /// an unordered one only for signaling NaNs. Never raises
    /// inexact/overflow/underflow. `+0` and `−0` compare equal.
    pub fn compare(
        &self,
        lhs: &FloatValue,
        rhs: &FloatValue,
        ordered: bool,
        session: &mut Session,
    ) -> Option<Ordering> {
        if lhs.is_nan() || rhs.is_nan() {
            if ordered || lhs.is_signaling_nan() || rhs.is_signaling_nan() {
                session.raise(ExceptionFlags::INVALID_OPERATION);
            }
            return None;
        }
        match (lhs, rhs) {
            (FloatValue::Infinity { sign: lhs_sign }, FloatValue::Infinity { sign: rhs_sign }) => {
                Some(if lhs_sign == rhs_sign {
                    Ordering::Equal
                } else if lhs_sign.is_negative() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                })
            }
            (FloatValue::Infinity { sign }, _) => Some(if sign.is_negative() {
                Ordering::Less
            } else {
                Ordering::Greater
            }),
            (_, FloatValue::Infinity { sign }) => Some(if sign.is_negative() {
                Ordering::Greater
            } else {
                Ordering::Less
            }),
            _ => Some(
                lhs.to_rational()
                    .expect("known to be finite")
                    .cmp(&rhs.to_rational().expect("known to be finite")),
            ),
        }
    }

    /// Sign of an exact zero produced by cancellation: `+0` under every mode
    /// except round-toward-−∞.
    fn exact_cancellation_sign(&self) -> Sign {
        match self.rounding {
            RoundingMode::TowardNegative => Sign::Negative,
            _ => Sign::Positive,
        }
    }

    /// Round an exact nonzero magnitude into the active precision and
    /// classify the result, raising flags on the session.
    fn round_result(
        &self,
        sign: Sign,
        magnitude: BigRational,
        session: &mut Session,
    ) -> FloatValue {
        debug_assert!(magnitude.is_positive());
        let spec = match self.precision {
            Precision::Infinite => {
                return FloatValue::finite(sign, FiniteClass::Normal, magnitude);
            }
            Precision::Fixed(spec) => spec,
        };
        let exponent = exact::floor_log2(&magnitude);
        if exponent > spec.max_exponent() {
            session.raise(ExceptionFlags::OVERFLOW | ExceptionFlags::INEXACT);
            return self.overflowed(sign, spec);
        }
        // Tininess is detected before rounding; subnormal candidates are
        // split at the format's minimum exponent instead of their own.
        let tiny = exponent < spec.min_exponent();
        let work_exponent = exponent.max(spec.min_exponent());
        let parts = exact::significand_parts(&magnitude, work_exponent, spec.mantissa_bits());
        let rounded = rounding::round_significand(
            parts,
            work_exponent,
            sign,
            self.rounding,
            spec.mantissa_bits(),
        );
        let mut flags = ExceptionFlags::empty();
        if rounded.inexact {
            flags |= ExceptionFlags::INEXACT;
        }
        if rounded.exponent > spec.max_exponent() {
            // The carry out of rounding can only move away from zero, so
            // landing past the range always means infinity.
            session.raise(flags | ExceptionFlags::OVERFLOW | ExceptionFlags::INEXACT);
            return FloatValue::infinity(sign);
        }
        if rounded.mantissa.is_zero() {
            session.raise(flags | ExceptionFlags::UNDERFLOW | ExceptionFlags::INEXACT);
            return FloatValue::zero(sign);
        }
        let min_normal_significand = BigUint::one() << spec.mantissa_bits() as usize;
        if rounded.mantissa < min_normal_significand {
            if !spec.subnormals_enabled() {
                // Flush-to-zero format: the whole subnormal range underflows.
                session.raise(flags | ExceptionFlags::UNDERFLOW | ExceptionFlags::INEXACT);
                return FloatValue::zero(sign);
            }
            if tiny && rounded.inexact {
                flags |= ExceptionFlags::UNDERFLOW;
            }
            session.raise(flags);
            return FloatValue::finite(
                sign,
                FiniteClass::Subnormal,
                exact::significand_value(&rounded.mantissa, rounded.exponent, spec.mantissa_bits()),
            );
        }
        if tiny && rounded.inexact {
            // Tiny before rounding even though rounding pulled the value up
            // to the minimum normal.
            flags |= ExceptionFlags::UNDERFLOW;
        }
        session.raise(flags);
        FloatValue::finite(
            sign,
            FiniteClass::Normal,
            exact::significand_value(&rounded.mantissa, rounded.exponent, spec.mantissa_bits()),
        )
    }

    /// Result of an operation that overflowed before rounding: directed modes
    /// pointing back toward zero saturate at the largest finite value,
    /// everything else gives infinity.
    fn overflowed(&self, sign: Sign, spec: FormatSpec) -> FloatValue {
        match (self.rounding, sign) {
            (RoundingMode::TowardZero, _)
            | (RoundingMode::TowardPositive, Sign::Negative)
            | (RoundingMode::TowardNegative, Sign::Positive) => {
                FloatValue::finite(sign, FiniteClass::Normal, spec.max_finite())
            }
            _ => FloatValue::infinity(sign),
        }
    }
}

/// Quiet the first NaN operand, raising `INVALID_OPERATION` if either input
/// was signaling. Payload and sign of the propagated NaN are preserved.
fn propagate_nan(lhs: &FloatValue, rhs: &FloatValue, session: &mut Session) -> FloatValue {
    if lhs.is_signaling_nan() || rhs.is_signaling_nan() {
        session.raise(ExceptionFlags::INVALID_OPERATION);
    }
    if lhs.is_nan() {
        lhs.to_quiet_nan()
    } else {
        rhs.to_quiet_nan()
    }
}

fn invalid_operation(session: &mut Session) -> FloatValue {
    session.raise(ExceptionFlags::INVALID_OPERATION);
    FloatValue::quiet_nan()
}
