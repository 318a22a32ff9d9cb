// SPDX-License-Identifier: BSD-2-Clause

//! The runtime value type.

use crate::codec;
use crate::error::{CodecError, ParseError};
use crate::exact;
use crate::format::FormatSpec;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Num, One, Signed, Zero};
use std::fmt;
use std::num::FpCategory;
use std::ops::{Mul, MulAssign, Neg};

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Sign {
    Positive = 0,
    Negative = 1,
}

impl Neg for Sign {
    type Output = Self;
    fn neg(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

impl Mul for Sign {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        match self {
            Self::Positive => rhs,
            Self::Negative => -rhs,
        }
    }
}

impl MulAssign for Sign {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sign {
    #[inline]
    pub fn is_negative(self) -> bool {
        self == Sign::Negative
    }

    /// Sign of an exact rational; zero counts as positive.
    pub fn of_rational(value: &BigRational) -> Self {
        if value.is_negative() {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }
}

/// The five classifications a value can take.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FloatClass {
    Zero,
    Subnormal,
    Normal,
    Infinity,
    NaN,
}

/// Whether a finite nonzero value sits in the format's subnormal or normal
/// range. Exact intermediate results that have not been rounded into a format
/// yet are carried as `Normal`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FiniteClass {
    Subnormal,
    Normal,
}

/// A simulated floating-point value.
///
/// A closed tagged variant so arithmetic dispatch can match exhaustively.
/// Finite nonzero values carry their *exact* rational magnitude, the true
/// mathematical value before any format-specific rounding has been applied.
/// A value produced by [`decode`](crate::decode) is always exactly
/// representable in its format; an intermediate result of an exact
/// computation may not be, until the engine's single rounding step normalizes
/// it.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum FloatValue {
    Zero {
        sign: Sign,
    },
    Finite {
        sign: Sign,
        class: FiniteClass,
        /// Strictly positive.
        magnitude: BigRational,
    },
    Infinity {
        sign: Sign,
    },
    NaN {
        sign: Sign,
        /// Mantissa-field bits below the quiet bit.
        payload: BigUint,
        signaling: bool,
    },
}

impl FloatValue {
    pub fn zero(sign: Sign) -> Self {
        FloatValue::Zero { sign }
    }

    pub fn infinity(sign: Sign) -> Self {
        FloatValue::Infinity { sign }
    }

    /// The canonical quiet NaN: positive, empty payload.
    pub fn quiet_nan() -> Self {
        FloatValue::NaN {
            sign: Sign::Positive,
            payload: BigUint::zero(),
            signaling: false,
        }
    }

    /// The canonical signaling NaN: positive, lowest payload bit set (an
    /// empty signaling payload would encode as infinity).
    pub fn signaling_nan() -> Self {
        FloatValue::NaN {
            sign: Sign::Positive,
            payload: BigUint::one(),
            signaling: true,
        }
    }

    pub fn nan(sign: Sign, payload: BigUint, signaling: bool) -> Self {
        FloatValue::NaN {
            sign,
            payload,
            signaling,
        }
    }

    /// An exact value, as used in infinite-precision mode. The sign is taken
    /// from the rational; an exact zero becomes `+0`.
    pub fn from_rational(value: BigRational) -> Self {
        if value.is_zero() {
            return FloatValue::Zero {
                sign: Sign::Positive,
            };
        }
        FloatValue::Finite {
            sign: Sign::of_rational(&value),
            class: FiniteClass::Normal,
            magnitude: value.abs(),
        }
    }

    pub(crate) fn finite(sign: Sign, class: FiniteClass, magnitude: BigRational) -> Self {
        debug_assert!(magnitude.is_positive());
        FloatValue::Finite {
            sign,
            class,
            magnitude,
        }
    }

    /// Build a value from raw sign/exponent/mantissa fields of a format.
    pub fn from_fields(
        sign: Sign,
        exponent_field: &BigUint,
        mantissa_field: &BigUint,
        spec: &FormatSpec,
    ) -> Result<Self, CodecError> {
        codec::decode_fields(sign, exponent_field, mantissa_field, spec)
    }

    /// Exact conversion; every finite `f64` is a binary rational.
    pub fn from_f64(value: f64) -> Self {
        let sign = if value.is_sign_negative() {
            Sign::Negative
        } else {
            Sign::Positive
        };
        match value.classify() {
            FpCategory::Nan => FloatValue::NaN {
                sign,
                payload: BigUint::zero(),
                signaling: false,
            },
            FpCategory::Infinite => FloatValue::Infinity { sign },
            FpCategory::Zero => FloatValue::Zero { sign },
            FpCategory::Subnormal | FpCategory::Normal => {
                let magnitude = BigRational::from_float(value.abs())
                    .expect("finite float converts exactly");
                FloatValue::Finite {
                    sign,
                    class: if value.classify() == FpCategory::Subnormal {
                        FiniteClass::Subnormal
                    } else {
                        FiniteClass::Normal
                    },
                    magnitude,
                }
            }
        }
    }

    /// Exact conversion; every finite `f32` is a binary rational.
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(value.into())
    }

    /// Parse a decimal literal (`-12.5e-3` style) or one of the keywords
    /// `inf`/`infinity`/`nan`/`snan`, case-insensitive, optionally signed.
    pub fn from_decimal_str(text: &str) -> Result<Self, ParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }
        let (sign, rest) = split_sign(trimmed);
        if rest.is_empty() {
            return Err(ParseError::NoDigits);
        }
        match rest.to_ascii_lowercase().as_str() {
            "inf" | "infinity" => return Ok(Self::infinity(sign)),
            "nan" => {
                return Ok(Self::nan(sign, BigUint::zero(), false));
            }
            "snan" => {
                return Ok(Self::nan(sign, BigUint::one(), true));
            }
            _ => {}
        }
        let offset = text.len() - text.trim_start().len() + (trimmed.len() - rest.len());
        let magnitude = parse_decimal_magnitude(rest, offset)?;
        Ok(signed_from_magnitude(sign, magnitude))
    }

    /// Parse a C99 hexadecimal-float literal such as `0x1.8p3`, optionally
    /// signed; the binary exponent defaults to 0 when absent.
    pub fn from_hex_str(text: &str) -> Result<Self, ParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }
        let (sign, rest) = split_sign(trimmed);
        let offset = text.len() - text.trim_start().len() + (trimmed.len() - rest.len());
        let magnitude = parse_hex_magnitude(rest, offset)?;
        Ok(signed_from_magnitude(sign, magnitude))
    }

    pub fn class(&self) -> FloatClass {
        match self {
            FloatValue::Zero { .. } => FloatClass::Zero,
            FloatValue::Finite { class, .. } => match class {
                FiniteClass::Subnormal => FloatClass::Subnormal,
                FiniteClass::Normal => FloatClass::Normal,
            },
            FloatValue::Infinity { .. } => FloatClass::Infinity,
            FloatValue::NaN { .. } => FloatClass::NaN,
        }
    }

    pub fn sign(&self) -> Sign {
        match self {
            FloatValue::Zero { sign }
            | FloatValue::Finite { sign, .. }
            | FloatValue::Infinity { sign }
            | FloatValue::NaN { sign, .. } => *sign,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self, FloatValue::Zero { .. })
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        matches!(self, FloatValue::Zero { .. } | FloatValue::Finite { .. })
    }

    #[inline]
    pub fn is_infinity(&self) -> bool {
        matches!(self, FloatValue::Infinity { .. })
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        matches!(self, FloatValue::NaN { .. })
    }

    #[inline]
    pub fn is_signaling_nan(&self) -> bool {
        matches!(self, FloatValue::NaN { signaling: true, .. })
    }

    /// The exact magnitude of a finite nonzero value.
    pub fn magnitude(&self) -> Option<&BigRational> {
        match self {
            FloatValue::Finite { magnitude, .. } => Some(magnitude),
            _ => None,
        }
    }

    /// The exact signed value of a finite value; the sign of a zero is lost.
    pub fn to_rational(&self) -> Option<BigRational> {
        match self {
            FloatValue::Zero { .. } => Some(BigRational::zero()),
            FloatValue::Finite {
                sign, magnitude, ..
            } => Some(match sign {
                Sign::Positive => magnitude.clone(),
                Sign::Negative => -magnitude.clone(),
            }),
            _ => None,
        }
    }

    pub fn neg(&self) -> Self {
        let mut retval = self.clone();
        retval.set_sign(-self.sign());
        retval
    }

    pub fn abs(&self) -> Self {
        let mut retval = self.clone();
        retval.set_sign(Sign::Positive);
        retval
    }

    pub fn copy_sign(&self, sign_src: &Self) -> Self {
        let mut retval = self.clone();
        retval.set_sign(sign_src.sign());
        retval
    }

    fn set_sign(&mut self, new_sign: Sign) {
        match self {
            FloatValue::Zero { sign }
            | FloatValue::Finite { sign, .. }
            | FloatValue::Infinity { sign }
            | FloatValue::NaN { sign, .. } => *sign = new_sign,
        }
    }

    /// The quiet twin of a NaN, payload preserved. Identity on everything
    /// else.
    pub(crate) fn to_quiet_nan(&self) -> Self {
        match self {
            FloatValue::NaN { sign, payload, .. } => FloatValue::NaN {
                sign: *sign,
                payload: payload.clone(),
                signaling: false,
            },
            _ => self.clone(),
        }
    }

    /// Decimal rendition of the value.
    ///
    /// Exact whenever the magnitude has a terminating decimal expansion
    /// (every fixed-precision value does); otherwise correctly rounded
    /// half-even at `max_fraction_digits` digits after the point.
    pub fn decimal_string(&self, max_fraction_digits: usize) -> String {
        let prefix = if self.sign().is_negative() { "-" } else { "" };
        match self {
            FloatValue::Zero { .. } => format!("{}0", prefix),
            FloatValue::Infinity { .. } => format!("{}inf", prefix),
            FloatValue::NaN { signaling, .. } => {
                if *signaling {
                    format!("{}snan", prefix)
                } else {
                    format!("{}nan", prefix)
                }
            }
            FloatValue::Finite { magnitude, .. } => {
                format!("{}{}", prefix, magnitude_to_decimal(magnitude, max_fraction_digits))
            }
        }
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.decimal_string(30))
    }
}

fn signed_from_magnitude(sign: Sign, magnitude: BigRational) -> FloatValue {
    if magnitude.is_zero() {
        FloatValue::Zero { sign }
    } else {
        FloatValue::Finite {
            sign,
            class: FiniteClass::Normal,
            magnitude,
        }
    }
}

fn split_sign(text: &str) -> (Sign, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (Sign::Negative, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (Sign::Positive, rest)
    } else {
        (Sign::Positive, text)
    }
}

const MAX_LITERAL_EXPONENT: i64 = 1 << 20;

fn pow10(exponent: i64) -> Result<BigRational, ParseError> {
    if exponent.abs() > MAX_LITERAL_EXPONENT {
        return Err(ParseError::ExponentOutOfRange);
    }
    let power = BigInt::from(10u32).pow(exponent.unsigned_abs() as u32);
    Ok(if exponent >= 0 {
        BigRational::from(power)
    } else {
        BigRational::new(BigInt::one(), power)
    })
}

/// Signed decimal exponent tail, digits required.
fn parse_exponent(text: &str, offset: usize) -> Result<i64, ParseError> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidDigit(offset));
    }
    let value: i64 = digits
        .parse()
        .map_err(|_| ParseError::ExponentOutOfRange)?;
    Ok(if negative { -value } else { value })
}

/// `offset` is the byte position of `text` in the original input, so error
/// positions stay meaningful after the sign has been split off.
fn parse_decimal_magnitude(text: &str, offset: usize) -> Result<BigRational, ParseError> {
    let bytes = text.as_bytes();
    let mut digits = String::new();
    let mut fraction_len = 0i64;
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        digits.push(bytes[i] as char);
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            digits.push(bytes[i] as char);
            fraction_len += 1;
            i += 1;
        }
    }
    if digits.is_empty() {
        return Err(ParseError::NoDigits);
    }
    let mut exponent = -fraction_len;
    if i < bytes.len() {
        if bytes[i] != b'e' && bytes[i] != b'E' {
            return Err(ParseError::InvalidDigit(offset + i));
        }
        exponent = exponent
            .checked_add(parse_exponent(&text[i + 1..], offset + i + 1)?)
            .ok_or(ParseError::ExponentOutOfRange)?;
        i = bytes.len();
    }
    debug_assert_eq!(i, bytes.len());
    let mantissa = BigInt::from_str_radix(&digits, 10).expect("scanned digits only");
    Ok(BigRational::from(mantissa) * pow10(exponent)?)
}

/// `offset` plays the same role as in [`parse_decimal_magnitude`]; positions
/// inside the body additionally account for the `0x` prefix.
fn parse_hex_magnitude(text: &str, offset: usize) -> Result<BigRational, ParseError> {
    let body = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or(ParseError::MissingHexPrefix)?;
    let bytes = body.as_bytes();
    let mut digits = String::new();
    let mut fraction_len = 0i64;
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
        digits.push(bytes[i] as char);
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
            digits.push(bytes[i] as char);
            fraction_len += 1;
            i += 1;
        }
    }
    if digits.is_empty() {
        return Err(ParseError::NoDigits);
    }
    let mut exponent = 0i64;
    if i < bytes.len() {
        if bytes[i] != b'p' && bytes[i] != b'P' {
            return Err(ParseError::InvalidDigit(offset + i + 2));
        }
        exponent = parse_exponent(&body[i + 1..], offset + i + 3)?;
        i = bytes.len();
    }
    debug_assert_eq!(i, bytes.len());
    if exponent.abs() > MAX_LITERAL_EXPONENT {
        return Err(ParseError::ExponentOutOfRange);
    }
    let mantissa = BigInt::from_str_radix(&digits, 16).expect("scanned hex digits only");
    Ok(BigRational::from(mantissa) * exact::pow2(exponent - 4 * fraction_len))
}

/// Render `magnitude > 0` in decimal, per [`FloatValue::decimal_string`].
fn magnitude_to_decimal(magnitude: &BigRational, max_fraction_digits: usize) -> String {
    let denom = magnitude.denom().to_biguint().expect("canonical positive denom");
    let (twos, rest) = strip_factor(&denom, 2u32);
    let (fives, rest) = strip_factor(&rest, 5u32);
    if rest.is_one() {
        // Terminating expansion: scale the denominator up to a power of ten.
        let point = twos.max(fives);
        let scaled = magnitude.numer().to_biguint().expect("positive")
            * BigUint::from(2u32).pow((point - twos) as u32)
            * BigUint::from(5u32).pow((point - fives) as u32);
        place_decimal_point(scaled, point as usize)
    } else {
        let scaled = magnitude * pow10_unchecked(max_fraction_digits);
        place_decimal_point(round_half_even(&scaled), max_fraction_digits)
    }
}

fn pow10_unchecked(exponent: usize) -> BigRational {
    BigRational::from(BigInt::from(10u32).pow(exponent as u32))
}

/// Split `value` into (multiplicity of `factor`, remaining cofactor).
fn strip_factor(value: &BigUint, factor: u32) -> (u64, BigUint) {
    let factor = BigUint::from(factor);
    let mut remaining = value.clone();
    let mut count = 0u64;
    loop {
        let (quotient, remainder) = remaining.div_rem(&factor);
        if !remainder.is_zero() {
            return (count, remaining);
        }
        remaining = quotient;
        count += 1;
    }
}

/// Nearest integer, ties to even. Requires `value >= 0`.
fn round_half_even(value: &BigRational) -> BigUint {
    let floor = value.to_integer().to_biguint().expect("non-negative");
    let remainder = value - BigRational::from(BigInt::from(floor.clone()));
    let half = BigRational::new(BigInt::one(), BigInt::from(2u32));
    match remainder.cmp(&half) {
        std::cmp::Ordering::Less => floor,
        std::cmp::Ordering::Greater => floor + BigUint::one(),
        std::cmp::Ordering::Equal => {
            if floor.is_even() {
                floor
            } else {
                floor + BigUint::one()
            }
        }
    }
}

/// Print `digits` with a decimal point `point` places from the right,
/// trailing fractional zeros trimmed.
fn place_decimal_point(digits: BigUint, point: usize) -> String {
    let mut text = digits.to_str_radix(10);
    if point == 0 {
        return text;
    }
    while text.len() <= point {
        text.insert(0, '0');
    }
    let split = text.len() - point;
    let fraction = text.split_off(split).trim_end_matches('0').to_string();
    if fraction.is_empty() {
        text
    } else {
        format!("{}.{}", text, fraction)
    }
}
