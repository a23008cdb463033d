//! # BN254 Field Elements
//!
//! [`FieldElement`] wraps the arkworks BN254 scalar (`ark_bn254::Fr`). Every
//! circuit input, commitment, nullifier, tree node and packed reveal chunk is
//! one of these.
//!
//! ## Encoding
//!
//! - Text form is the canonical decimal representation (what snark toolchains
//!   emit in public signals). `0x`-prefixed hex is accepted on input.
//! - Byte form is 32 bytes little-endian, matching the packing codec.
//! - Parsing is strict: values at or above the modulus are rejected rather
//!   than silently reduced. Reduction is only available through the explicitly
//!   named [`FieldElement::from_le_bytes_mod_order`].

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::FieldError;

/// An element of the BN254 scalar field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldElement(Fr);

impl FieldElement {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(Fr::zero())
    }

    /// Embed a small integer.
    pub fn from_u64(value: u64) -> Self {
        Self(Fr::from(value))
    }

    /// Interpret little-endian bytes as an integer and reduce it modulo the
    /// field order.
    pub fn from_le_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(Fr::from_le_bytes_mod_order(bytes))
    }

    /// Interpret big-endian bytes as an integer and reduce it modulo the
    /// field order.
    pub fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(Fr::from_be_bytes_mod_order(bytes))
    }

    /// Convert an unsigned integer, rejecting values at or above the modulus.
    pub fn try_from_biguint(value: &BigUint) -> Result<Self, FieldError> {
        if value >= &modulus() {
            return Err(FieldError::OutOfRange(value.to_string()));
        }
        Ok(Self(Fr::from_le_bytes_mod_order(&value.to_bytes_le())))
    }

    /// The canonical integer representative.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0.into_bigint().to_bytes_le())
    }

    /// 32-byte little-endian encoding.
    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        let bytes = self.0.into_bigint().to_bytes_le();
        out[..bytes.len()].copy_from_slice(&bytes);
        out
    }

    /// 32-byte big-endian encoding.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = self.to_le_bytes();
        out.reverse();
        out
    }

    /// `0x`-prefixed, zero-padded 64-character lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_be_bytes()))
    }

    /// Canonical decimal string.
    pub fn to_decimal(&self) -> String {
        self.to_biguint().to_string()
    }

    /// Bit `i` of the canonical representative (bit 0 is least significant).
    pub fn bit(&self, i: usize) -> bool {
        self.0.into_bigint().get_bit(i)
    }

    /// Whether this is the additive identity.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Access the arkworks scalar.
    pub fn inner(&self) -> Fr {
        self.0
    }
}

/// The BN254 scalar field modulus as an unsigned integer.
pub fn modulus() -> BigUint {
    BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le())
}

impl From<Fr> for FieldElement {
    fn from(value: Fr) -> Self {
        Self(value)
    }
}

impl From<FieldElement> for Fr {
    fn from(value: FieldElement) -> Self {
        value.0
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl FromStr for FieldElement {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = if let Some(hex_digits) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            if hex_digits.is_empty() {
                None
            } else {
                BigUint::parse_bytes(hex_digits.as_bytes(), 16)
            }
        } else if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            BigUint::parse_bytes(trimmed.as_bytes(), 10)
        } else {
            None
        };
        let value = parsed.ok_or_else(|| FieldError::InvalidLiteral(s.to_string()))?;
        Self::try_from_biguint(&value)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_decimal())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A user-held secret scalar.
///
/// Never persisted by this workspace and never printed: `Debug` is redacted
/// and the backing bytes are zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretScalar {
    le_bytes: [u8; 32],
}

impl SecretScalar {
    /// Wrap a field element as a secret.
    pub fn new(value: FieldElement) -> Self {
        Self {
            le_bytes: value.to_le_bytes(),
        }
    }

    /// Parse a secret from a decimal or hex literal.
    pub fn parse(literal: &str) -> Result<Self, FieldError> {
        literal.parse::<FieldElement>().map(Self::new)
    }

    /// The secret as a field element, for hashing.
    pub fn to_field(&self) -> FieldElement {
        FieldElement::from_le_bytes_mod_order(&self.le_bytes)
    }
}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar([REDACTED])")
    }
}
