// SPDX-License-Identifier: BSD-2-Clause

//! Software simulation of IEEE 754 binary floating-point arithmetic.
//!
//! Values are kept as exact rationals plus a classification, so every
//! operation can be computed exactly and then rounded once into the active
//! format. Formats are fully parameterized (exponent width, mantissa width,
//! bias, optional subnormal support), and an infinite-precision mode skips
//! rounding altogether. Exception flags accumulate stickily in a [`Session`]
//! owned by the caller.
//!
//! ```
//! use simfloat::{
//!     ArithmeticEngine, ExceptionFlags, FloatValue, FormatSpec, Precision, RoundingMode, Session,
//! };
//!
//! let engine = ArithmeticEngine::new(
//!     Precision::Fixed(FormatSpec::BINARY16),
//!     RoundingMode::NearestEven,
//! );
//! let mut session = Session::new();
//! let one = FloatValue::from_decimal_str("1.0").unwrap();
//! let third = engine.div(&one, &FloatValue::from_decimal_str("3").unwrap(), &mut session);
//! assert_eq!(third.to_string(), "0.333251953125");
//! assert!(session.is_raised(ExceptionFlags::INEXACT));
//! ```

mod codec;
mod engine;
mod error;
mod exact;
mod format;
mod rounding;
mod session;
mod value;

pub use crate::codec::{decode, encode};
pub use crate::engine::ArithmeticEngine;
pub use crate::error::{CodecError, ConfigError, ParseError};
pub use crate::format::{FormatSpec, Precision};
pub use crate::rounding::RoundingMode;
pub use crate::session::{ExceptionFlags, Session};
pub use crate::value::{FiniteClass, FloatClass, FloatValue, Sign};
