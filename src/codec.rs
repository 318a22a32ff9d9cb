// SPDX-License-Identifier: BSD-2-Clause

//! Bit-pattern encoding and decoding.
//!
//! The canonical layout is the IEEE 754 interchange one: sign bit on top,
//! then the exponent field, then the mantissa field. All-zero exponent means
//! zero or subnormal, all-one means infinity or NaN; a NaN is quiet when the
//! mantissa MSB is set and its payload is the mantissa bits below that.

use crate::error::CodecError;
use crate::exact;
use crate::format::FormatSpec;
use crate::value::{FiniteClass, FloatValue, Sign};
use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

/// Decode a canonical bit pattern. Total over every pattern that fits in the
/// format's width; wider patterns are a programmer error.
pub fn decode(bits: &BigUint, spec: &FormatSpec) -> Result<FloatValue, CodecError> {
    if bits.bits() > spec.width() as u64 {
        return Err(CodecError::PatternTooWide {
            width: spec.width(),
        });
    }
    let mantissa_bits = spec.mantissa_bits();
    let mantissa_field = bits & &mantissa_mask(spec);
    let exponent_field =
        (bits >> mantissa_bits as usize) & ((BigUint::one() << spec.exponent_bits()) - BigUint::one());
    let sign = if bits.bit(spec.width() as u64 - 1) {
        Sign::Negative
    } else {
        Sign::Positive
    };
    decode_fields(sign, &exponent_field, &mantissa_field, spec)
}

/// Decode from already-split fields; backs [`FloatValue::from_fields`].
pub(crate) fn decode_fields(
    sign: Sign,
    exponent_field: &BigUint,
    mantissa_field: &BigUint,
    spec: &FormatSpec,
) -> Result<FloatValue, CodecError> {
    if exponent_field.bits() > spec.exponent_bits() as u64 {
        return Err(CodecError::ExponentFieldOutOfRange {
            exponent_bits: spec.exponent_bits(),
        });
    }
    if mantissa_field.bits() > spec.mantissa_bits() as u64 {
        return Err(CodecError::MantissaFieldOutOfRange {
            mantissa_bits: spec.mantissa_bits(),
        });
    }
    let mantissa_bits = spec.mantissa_bits();
    if exponent_field.is_zero() {
        if mantissa_field.is_zero() {
            return Ok(FloatValue::zero(sign));
        }
        return Ok(FloatValue::finite(
            sign,
            FiniteClass::Subnormal,
            exact::significand_value(mantissa_field, spec.min_exponent(), mantissa_bits),
        ));
    }
    if *exponent_field == BigUint::from(spec.exponent_field_inf_nan() as u64) {
        if mantissa_field.is_zero() {
            return Ok(FloatValue::infinity(sign));
        }
        let quiet_bit = BigUint::one() << (mantissa_bits - 1) as usize;
        let quiet = mantissa_field.bit(mantissa_bits as u64 - 1);
        let payload = mantissa_field & (&quiet_bit - BigUint::one());
        return Ok(FloatValue::nan(sign, payload, !quiet));
    }
    let unbiased = exponent_field
        .to_i64()
        .expect("exponent field fits in i64 by construction")
        - spec.bias();
    let significand = mantissa_field + (BigUint::one() << mantissa_bits as usize);
    Ok(FloatValue::finite(
        sign,
        FiniteClass::Normal,
        exact::significand_value(&significand, unbiased, mantissa_bits),
    ))
}

/// Encode a value that is exactly representable in `spec`.
///
/// Values that were never rounded into the format fail with
/// [`CodecError::NotRepresentable`]; that is a precondition violation, not an
/// IEEE exception.
pub fn encode(value: &FloatValue, spec: &FormatSpec) -> Result<BigUint, CodecError> {
    let mantissa_bits = spec.mantissa_bits();
    let (exponent_field, mantissa_field) = match value {
        FloatValue::Zero { .. } => (BigUint::zero(), BigUint::zero()),
        FloatValue::Infinity { .. } => (
            BigUint::from(spec.exponent_field_inf_nan() as u64),
            BigUint::zero(),
        ),
        FloatValue::NaN {
            payload, signaling, ..
        } => {
            let quiet_bit = BigUint::one() << (mantissa_bits - 1) as usize;
            if *payload >= quiet_bit {
                return Err(CodecError::NanPayloadTooWide);
            }
            if *signaling && payload.is_zero() {
                return Err(CodecError::EmptySignalingNanPayload);
            }
            let mantissa = if *signaling {
                payload.clone()
            } else {
                payload | &quiet_bit
            };
            (
                BigUint::from(spec.exponent_field_inf_nan() as u64),
                mantissa,
            )
        }
        FloatValue::Finite { magnitude, .. } => encode_finite_fields(magnitude, spec)?,
    };
    let mut bits = (exponent_field << mantissa_bits as usize) | mantissa_field;
    if value.sign().is_negative() {
        bits |= BigUint::one() << (spec.width() - 1);
    }
    Ok(bits)
}

fn encode_finite_fields(
    magnitude: &BigRational,
    spec: &FormatSpec,
) -> Result<(BigUint, BigUint), CodecError> {
    let mantissa_bits = spec.mantissa_bits();
    let exponent = exact::floor_log2(magnitude);
    if exponent > spec.max_exponent() {
        return Err(CodecError::NotRepresentable);
    }
    if exponent >= spec.min_exponent() {
        let significand = magnitude * exact::pow2(mantissa_bits as i64 - exponent);
        if !significand.is_integer() {
            return Err(CodecError::NotRepresentable);
        }
        // floor_log2 pins the significand into [2^mb, 2^(mb+1)).
        let significand = significand.to_integer().to_biguint().expect("positive");
        let exponent_field = BigUint::from((exponent + spec.bias()) as u64);
        let mantissa_field = significand - (BigUint::one() << mantissa_bits as usize);
        return Ok((exponent_field, mantissa_field));
    }
    // Below the normal range: try the subnormal encoding, pinned to the
    // minimum exponent.
    let significand = magnitude * exact::pow2(mantissa_bits as i64 - spec.min_exponent());
    if !significand.is_integer() {
        return Err(CodecError::NotRepresentable);
    }
    let mantissa_field = significand.to_integer().to_biguint().expect("positive");
    if mantissa_field.is_zero() {
        return Err(CodecError::NotRepresentable);
    }
    Ok((BigUint::zero(), mantissa_field))
}

fn mantissa_mask(spec: &FormatSpec) -> BigUint {
    (BigUint::one() << spec.mantissa_bits() as usize) - BigUint::one()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn b16(bits: u32) -> FloatValue {
        decode(&BigUint::from(bits), &FormatSpec::BINARY16).unwrap()
    }

    fn ratio(numer: i64, denom: i64) -> BigRational {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn classification_of_binary16_patterns() {
        use crate::value::FloatClass::*;
        assert_eq!(b16(0x0000).class(), Zero);
        assert_eq!(b16(0x0001).class(), Subnormal);
        assert_eq!(b16(0x03FF).class(), Subnormal);
        assert_eq!(b16(0x0400).class(), Normal);
        assert_eq!(b16(0x3C00).class(), Normal);
        assert_eq!(b16(0x7BFF).class(), Normal);
        assert_eq!(b16(0x7C00).class(), Infinity);
        assert_eq!(b16(0x7C01).class(), NaN);
        assert_eq!(b16(0x7E00).class(), NaN);
        assert_eq!(b16(0x8000).class(), Zero);
        assert_eq!(b16(0x8001).class(), Subnormal);
        assert_eq!(b16(0xFC00).class(), Infinity);
        assert_eq!(b16(0xFFFF).class(), NaN);
        assert_eq!(b16(0x8000).sign(), Sign::Negative);
        assert!(b16(0x7C01).is_signaling_nan());
        assert!(b16(0x7DFF).is_signaling_nan());
        assert!(!b16(0x7E00).is_signaling_nan());
        assert!(!b16(0x7FFF).is_signaling_nan());
    }

    #[test]
    fn decoded_magnitudes_are_exact() {
        assert_eq!(b16(0x0000).to_rational(), Some(ratio(0, 1)));
        assert_eq!(b16(0x0001).to_rational(), Some(ratio(1, 1 << 24)));
        assert_eq!(b16(0x03FF).to_rational(), Some(ratio(1023, 1 << 24)));
        assert_eq!(b16(0x0400).to_rational(), Some(ratio(1, 1 << 14)));
        assert_eq!(b16(0x3C00).to_rational(), Some(ratio(1, 1)));
        assert_eq!(b16(0x7BFF).to_rational(), Some(ratio(65504, 1)));
        assert_eq!(b16(0x8001).to_rational(), Some(ratio(-1, 1 << 24)));
        assert_eq!(b16(0xBC00).to_rational(), Some(ratio(-1, 1)));
        assert_eq!(b16(0x7C00).to_rational(), None);
        assert_eq!(b16(0x7E00).to_rational(), None);
    }

    #[test]
    fn round_trip_of_representative_patterns() {
        let spec = FormatSpec::BINARY16;
        for bits in [
            0x0000u32, 0x0001, 0x03FF, 0x0400, 0x3C00, 0x3C01, 0x7BFF, 0x7C00, 0x7C01, 0x7DFF,
            0x7E00, 0x7FFF, 0x8000, 0x8001, 0x83FF, 0x8400, 0xBC00, 0xFBFF, 0xFC00, 0xFE00,
            0xFFFF,
        ] {
            let pattern = BigUint::from(bits);
            let value = decode(&pattern, &spec).unwrap();
            assert_eq!(encode(&value, &spec).unwrap(), pattern, "bits {:#06x}", bits);
        }
    }

    #[test]
    fn nan_payload_survives_the_codec() {
        let spec = FormatSpec::BINARY16;
        let nan = FloatValue::nan(Sign::Negative, BigUint::from(0x55u32), false);
        let bits = encode(&nan, &spec).unwrap();
        assert_eq!(bits, BigUint::from(0xFE55u32));
        assert_eq!(decode(&bits, &spec).unwrap(), nan);

        let snan = FloatValue::nan(Sign::Positive, BigUint::from(0x155u32), true);
        let bits = encode(&snan, &spec).unwrap();
        assert_eq!(bits, BigUint::from(0x7D55u32));
        assert_eq!(decode(&bits, &spec).unwrap(), snan);
    }

    #[test]
    fn encode_rejects_unrepresentable_values() {
        let spec = FormatSpec::BINARY16;
        assert_eq!(
            encode(&FloatValue::from_rational(ratio(1, 3)), &spec),
            Err(CodecError::NotRepresentable)
        );
        // Exceeds the exponent range even though it is a binary rational.
        assert_eq!(
            encode(&FloatValue::from_rational(ratio(1 << 17, 1)), &spec),
            Err(CodecError::NotRepresentable)
        );
        // Too small for even the subnormal range.
        assert_eq!(
            encode(&FloatValue::from_rational(ratio(1, 1 << 30)), &spec),
            Err(CodecError::NotRepresentable)
        );
        // One more significand bit than binary16 has.
        assert_eq!(
            encode(&FloatValue::from_rational(ratio(2049, 2048)), &spec),
            Err(CodecError::NotRepresentable)
        );
    }

    #[test]
    fn encode_rejects_bad_nan_payloads() {
        let spec = FormatSpec::BINARY16;
        assert_eq!(
            encode(
                &FloatValue::nan(Sign::Positive, BigUint::from(0x200u32), false),
                &spec
            ),
            Err(CodecError::NanPayloadTooWide)
        );
        assert_eq!(
            encode(
                &FloatValue::nan(Sign::Positive, BigUint::zero(), true),
                &spec
            ),
            Err(CodecError::EmptySignalingNanPayload)
        );
    }

    #[test]
    fn decode_rejects_wide_patterns() {
        assert_eq!(
            decode(&BigUint::from(0x1_0000u32), &FormatSpec::BINARY16),
            Err(CodecError::PatternTooWide { width: 16 })
        );
    }

    #[test]
    fn from_fields_checks_ranges() {
        let spec = FormatSpec::BINARY16;
        assert_eq!(
            FloatValue::from_fields(
                Sign::Positive,
                &BigUint::from(32u32),
                &BigUint::zero(),
                &spec
            ),
            Err(CodecError::ExponentFieldOutOfRange { exponent_bits: 5 })
        );
        assert_eq!(
            FloatValue::from_fields(
                Sign::Positive,
                &BigUint::from(15u32),
                &BigUint::from(0x400u32),
                &spec
            ),
            Err(CodecError::MantissaFieldOutOfRange { mantissa_bits: 10 })
        );
        assert_eq!(
            FloatValue::from_fields(
                Sign::Positive,
                &BigUint::from(15u32),
                &BigUint::zero(),
                &spec
            )
            .unwrap()
            .to_rational(),
            Some(ratio(1, 1))
        );
    }

    #[test]
    fn degenerate_format_has_no_normal_range() {
        // exponent_bits == 1: field 0 is zero/subnormal, field 1 is inf/nan.
        let spec = FormatSpec::with_bias(1, 2, 0, true).unwrap();
        let inf = decode(&BigUint::from(0b0_1_00u32), &spec).unwrap();
        assert!(inf.is_infinity());
        let sub = decode(&BigUint::from(0b0_0_01u32), &spec).unwrap();
        assert_eq!(sub.class(), crate::value::FloatClass::Subnormal);
    }
}
