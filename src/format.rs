// SPDX-License-Identifier: BSD-2-Clause

//! Fixed-precision format descriptions.

use crate::error::ConfigError;
use crate::exact;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

/// Describes a fixed-precision binary floating-point layout.
///
/// Pure data: exponent width, mantissa width, exponent bias and whether
/// subnormal values are supported. Validated once at construction and
/// immutable afterwards; formats are `Copy` and freely shared.
///
/// The bias defaults to the IEEE 754 convention `2^(exponent_bits-1) - 1` but
/// can be overridden for nonstandard experiments. `exponent_bits == 1` is
/// accepted even though such a format has no normal range at all.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FormatSpec {
    exponent_bits: u32,
    mantissa_bits: u32,
    bias: i64,
    subnormals_enabled: bool,
}

// Keeps every exponent computation comfortably inside i64.
const MAX_EXPONENT_BITS: u32 = 60;
const MAX_BIAS_MAGNITUDE: i64 = 1 << 60;

impl FormatSpec {
    /// A format with the conventional bias and subnormal support.
    pub fn new(exponent_bits: u32, mantissa_bits: u32) -> Result<Self, ConfigError> {
        if exponent_bits == 0 {
            return Err(ConfigError::ZeroExponentWidth);
        }
        Self::with_bias(
            exponent_bits,
            mantissa_bits,
            Self::default_bias(exponent_bits),
            true,
        )
    }

    /// A format with a caller-chosen bias and subnormal switch.
    pub fn with_bias(
        exponent_bits: u32,
        mantissa_bits: u32,
        bias: i64,
        subnormals_enabled: bool,
    ) -> Result<Self, ConfigError> {
        if exponent_bits == 0 {
            return Err(ConfigError::ZeroExponentWidth);
        }
        if mantissa_bits == 0 {
            return Err(ConfigError::ZeroMantissaWidth);
        }
        if exponent_bits > MAX_EXPONENT_BITS {
            return Err(ConfigError::ExponentWidthTooLarge(exponent_bits));
        }
        if bias.abs() > MAX_BIAS_MAGNITUDE {
            return Err(ConfigError::BiasOutOfRange(bias));
        }
        Ok(Self {
            exponent_bits,
            mantissa_bits,
            bias,
            subnormals_enabled,
        })
    }

    /// The conventional IEEE 754 bias for an exponent width.
    pub fn default_bias(exponent_bits: u32) -> i64 {
        (1i64 << (exponent_bits.min(MAX_EXPONENT_BITS) - 1)) - 1
    }

    /// Standard [__binary16__](https://en.wikipedia.org/wiki/Half-precision_floating-point_format) layout.
    pub const BINARY16: Self = Self {
        exponent_bits: 5,
        mantissa_bits: 10,
        bias: 15,
        subnormals_enabled: true,
    };
    /// Standard [__binary32__](https://en.wikipedia.org/wiki/Single-precision_floating-point_format) layout.
    pub const BINARY32: Self = Self {
        exponent_bits: 8,
        mantissa_bits: 23,
        bias: 127,
        subnormals_enabled: true,
    };
    /// Standard [__binary64__](https://en.wikipedia.org/wiki/Double-precision_floating-point_format) layout.
    pub const BINARY64: Self = Self {
        exponent_bits: 11,
        mantissa_bits: 52,
        bias: 1023,
        subnormals_enabled: true,
    };
    /// Standard [__binary128__](https://en.wikipedia.org/wiki/Quadruple-precision_floating-point_format) layout.
    pub const BINARY128: Self = Self {
        exponent_bits: 15,
        mantissa_bits: 112,
        bias: 16383,
        subnormals_enabled: true,
    };

    /// Number of bits in the exponent field.
    #[inline]
    pub const fn exponent_bits(self) -> u32 {
        self.exponent_bits
    }

    /// Number of bits in the mantissa field (excludes the implicit leading bit).
    #[inline]
    pub const fn mantissa_bits(self) -> u32 {
        self.mantissa_bits
    }

    #[inline]
    pub const fn bias(self) -> i64 {
        self.bias
    }

    #[inline]
    pub const fn subnormals_enabled(self) -> bool {
        self.subnormals_enabled
    }

    /// Total encoded width in bits, sign included.
    #[inline]
    pub const fn width(self) -> usize {
        1 + self.exponent_bits as usize + self.mantissa_bits as usize
    }

    /// Exponent field value reserved for infinities and NaNs (all ones).
    #[inline]
    pub const fn exponent_field_inf_nan(self) -> i64 {
        (1i64 << self.exponent_bits) - 1
    }

    /// Smallest unbiased exponent of a normal value.
    #[inline]
    pub const fn min_exponent(self) -> i64 {
        1 - self.bias
    }

    /// Largest unbiased exponent of a normal value.
    #[inline]
    pub const fn max_exponent(self) -> i64 {
        self.exponent_field_inf_nan() - 1 - self.bias
    }

    /// The largest finite magnitude: all-ones mantissa at `max_exponent`.
    pub fn max_finite(self) -> BigRational {
        let significand = (BigInt::one() << (self.mantissa_bits + 1)) - BigInt::one();
        BigRational::from(significand)
            * exact::pow2(self.max_exponent() - self.mantissa_bits as i64)
    }

    /// The smallest positive magnitude: the minimum subnormal, or the minimum
    /// normal when subnormals are disabled.
    pub fn min_positive(self) -> BigRational {
        if self.subnormals_enabled {
            exact::pow2(self.min_exponent() - self.mantissa_bits as i64)
        } else {
            exact::pow2(self.min_exponent())
        }
    }
}

/// Selects between a fixed-precision format and exact, never-rounded results.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Precision {
    Fixed(FormatSpec),
    Infinite,
}

impl Precision {
    #[inline]
    pub fn is_infinite(self) -> bool {
        matches!(self, Precision::Infinite)
    }

    #[inline]
    pub fn format_spec(self) -> Option<FormatSpec> {
        match self {
            Precision::Fixed(spec) => Some(spec),
            Precision::Infinite => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::ToPrimitive;

    #[test]
    fn validation() {
        assert_eq!(FormatSpec::new(0, 10), Err(ConfigError::ZeroExponentWidth));
        assert_eq!(
            FormatSpec::with_bias(5, 0, 15, true),
            Err(ConfigError::ZeroMantissaWidth)
        );
        assert_eq!(
            FormatSpec::new(61, 10),
            Err(ConfigError::ExponentWidthTooLarge(61))
        );
        assert!(FormatSpec::new(1, 1).is_ok());
    }

    #[test]
    fn standard_layouts() {
        assert_eq!(FormatSpec::new(5, 10).unwrap(), FormatSpec::BINARY16);
        assert_eq!(FormatSpec::new(8, 23).unwrap(), FormatSpec::BINARY32);
        assert_eq!(FormatSpec::new(11, 52).unwrap(), FormatSpec::BINARY64);
        assert_eq!(FormatSpec::new(15, 112).unwrap(), FormatSpec::BINARY128);
        assert_eq!(FormatSpec::BINARY16.width(), 16);
        assert_eq!(FormatSpec::BINARY64.width(), 64);
    }

    #[test]
    fn exponent_range() {
        let spec = FormatSpec::BINARY16;
        assert_eq!(spec.min_exponent(), -14);
        assert_eq!(spec.max_exponent(), 15);
        assert_eq!(spec.exponent_field_inf_nan(), 31);
        // binary16 max finite is 65504
        assert_eq!(spec.max_finite().to_integer().to_i64(), Some(65504));
        assert!(spec.max_finite().is_integer());
    }

    #[test]
    fn custom_bias_shifts_the_range() {
        let spec = FormatSpec::with_bias(5, 10, 0, true).unwrap();
        assert_eq!(spec.min_exponent(), 1);
        assert_eq!(spec.max_exponent(), 30);
    }
}
