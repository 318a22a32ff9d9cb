// SPDX-License-Identifier: BSD-2-Clause

//! Fatal configuration and programmer errors.
//!
//! These are deliberately separate from the IEEE 754 exception flags: a
//! flagged arithmetic condition still produces a well-defined value and is
//! reported through [`Session`](crate::Session), while the errors here mean a
//! precondition was violated and the call cannot produce a result at all.

use thiserror::Error;

/// A [`FormatSpec`](crate::FormatSpec) could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("exponent width must be at least 1")]
    ZeroExponentWidth,
    #[error("mantissa width must be at least 1")]
    ZeroMantissaWidth,
    #[error("exponent width {0} is not supported (maximum 60)")]
    ExponentWidthTooLarge(u32),
    #[error("exponent bias {0} is outside the supported range")]
    BiasOutOfRange(i64),
}

/// Encoding or decoding a bit pattern failed.
///
/// Every variant is a programmer error, not a numeric edge case: arithmetic
/// never produces a value that fails to encode under the format it was
/// rounded for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("bit pattern is wider than the format's {width} bits")]
    PatternTooWide { width: usize },
    #[error("exponent field does not fit in {exponent_bits} bits")]
    ExponentFieldOutOfRange { exponent_bits: u32 },
    #[error("mantissa field does not fit in {mantissa_bits} bits")]
    MantissaFieldOutOfRange { mantissa_bits: u32 },
    #[error("value is not representable in the target format")]
    NotRepresentable,
    #[error("NaN payload does not fit below the quiet bit")]
    NanPayloadTooWide,
    #[error("a signaling NaN with an empty payload would encode as infinity")]
    EmptySignalingNanPayload,
}

/// A numeric literal could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty literal")]
    Empty,
    #[error("invalid digit at byte {0}")]
    InvalidDigit(usize),
    #[error("literal has no digits")]
    NoDigits,
    #[error("missing hexadecimal prefix")]
    MissingHexPrefix,
    #[error("exponent is out of range")]
    ExponentOutOfRange,
}
