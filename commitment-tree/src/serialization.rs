//! Field-element codecs for the library boundary.
//!
//! Handles conversion between external encodings and field elements.
//! Byte arrays use Little-Endian format (as expected by Arkworks); hex
//! strings use the big-endian, `0x`-prefixed form shared with JS tooling
//! and on-chain verifiers. Every decoding path reduces its value modulo
//! the BN254 scalar field order.

use zkhash::ark_ff::{BigInteger, PrimeField};
use zkhash::fields::bn256::FpBN256 as Scalar;

use crate::error::MerkleError;

/// Size of a serialized field element in bytes.
pub const FIELD_SIZE: usize = 32;

/// Convert Little-Endian bytes to a field element.
pub fn bytes_to_scalar(bytes: &[u8]) -> Result<Scalar, MerkleError> {
    if bytes.len() != FIELD_SIZE {
        return Err(MerkleError::InvalidInput(format!(
            "expected {} bytes, got {}",
            FIELD_SIZE,
            bytes.len()
        )));
    }
    Ok(Scalar::from_le_bytes_mod_order(bytes))
}

/// Convert a field element to Little-Endian bytes (always [`FIELD_SIZE`]
/// bytes).
pub fn scalar_to_bytes(scalar: &Scalar) -> Vec<u8> {
    scalar.into_bigint().to_bytes_le()
}

/// Convert a field element to a `0x`-prefixed big-endian hex string.
///
/// The output is always 64 nibbles, zero-padded on the left.
pub fn scalar_to_hex(scalar: &Scalar) -> String {
    format!("0x{}", hex::encode(scalar.into_bigint().to_bytes_be()))
}

/// Convert a hex string to a field element.
///
/// Accepts an optional `0x` prefix and up to 64 nibbles; shorter strings
/// are zero-padded on the left.
pub fn hex_to_scalar(encoded: &str) -> Result<Scalar, MerkleError> {
    let digits = encoded.strip_prefix("0x").unwrap_or(encoded);

    if digits.is_empty() {
        return Err(MerkleError::MissingValue(
            "empty field element encoding".into(),
        ));
    }
    if digits.len() > 64 {
        return Err(MerkleError::InvalidInput(format!(
            "hex string of {} nibbles does not fit a {}-byte field element",
            digits.len(),
            FIELD_SIZE
        )));
    }

    // Pad to 64 characters so the decoded buffer is always full width
    let padded = format!("{digits:0>64}");
    let bytes = hex::decode(padded)
        .map_err(|e| MerkleError::InvalidInput(format!("invalid hex: {e}")))?;

    Ok(Scalar::from_be_bytes_mod_order(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use zkhash::ark_ff::Zero;

    #[test]
    fn hex_round_trip_is_canonical() {
        let scalar = hex_to_scalar("0x1f").expect("parse short hex");
        assert_eq!(scalar, Scalar::from(31u64));
        assert_eq!(
            scalar_to_hex(&scalar),
            format!("0x{:0>64}", "1f"),
            "canonical form is 64 nibbles"
        );
    }

    #[test]
    fn hex_prefix_is_optional() {
        let with_prefix = hex_to_scalar("0x2a").expect("parse with prefix");
        let without_prefix = hex_to_scalar("2a").expect("parse without prefix");
        assert_eq!(with_prefix, without_prefix);
        assert_eq!(with_prefix, Scalar::from(42u64));
    }

    #[test]
    fn empty_hex_is_a_missing_value() {
        let err = hex_to_scalar("0x").expect_err("empty encoding");
        assert!(matches!(err, MerkleError::MissingValue(_)));
    }

    #[test]
    fn oversized_hex_is_rejected() {
        let too_long = "ab".repeat(33);
        let err = hex_to_scalar(&too_long).expect_err("65+ nibbles");
        assert!(matches!(err, MerkleError::InvalidInput(_)));
    }

    #[test]
    fn non_hex_digits_are_rejected() {
        let err = hex_to_scalar("0xzz").expect_err("invalid digits");
        assert!(matches!(err, MerkleError::InvalidInput(_)));
    }

    #[test]
    fn values_reduce_modulo_the_field_order() {
        // The BN254 scalar modulus itself must decode to zero
        let modulus_hex = "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001";
        let scalar = hex_to_scalar(modulus_hex).expect("parse modulus");
        assert!(scalar.is_zero());
    }

    #[test]
    fn byte_round_trip_preserves_values() {
        let scalar = Scalar::from(123456789u64);
        let bytes = scalar_to_bytes(&scalar);
        assert_eq!(bytes.len(), FIELD_SIZE);
        let back = bytes_to_scalar(&bytes).expect("parse bytes");
        assert_eq!(back, scalar);
    }

    #[test]
    fn wrong_byte_length_is_rejected() {
        let err = bytes_to_scalar(&[0u8; 31]).expect_err("31 bytes");
        assert!(matches!(err, MerkleError::InvalidInput(_)));
    }

    #[test]
    fn hex_and_byte_codecs_agree() {
        let cases = [
            "0x01",
            "0x0a89ca6ffa14cc462cfedb842c30ed221a50a3d6bf022a6a57dc82ab24c157c9",
            "0x198622acbd783d1b0d9064105b1fc8e4d8889de95c4c519b3f635809fe6afc05",
        ];
        for case in cases {
            let via_hex = hex_to_scalar(case).expect("parse hex");

            let big = BigUint::parse_bytes(case.trim_start_matches("0x").as_bytes(), 16)
                .expect("parse as big integer");
            let mut le_bytes = big.to_bytes_le();
            le_bytes.resize(FIELD_SIZE, 0);
            let via_bytes = bytes_to_scalar(&le_bytes).expect("parse bytes");

            assert_eq!(via_hex, via_bytes, "codecs disagree on {case}");
        }
    }
}
