//! # Certificate Records
//!
//! The structured, immutable result of parsing a document-signing (DSC) or
//! country-signing (CSCA) certificate. Produced by the certificate parser in
//! `zkid-crypto`; consumed by the signature algorithm resolver and the circuit
//! identifier resolver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithm::{HashAlgorithm, SignatureAlgorithm};

/// Named elliptic curves accepted for issuer keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcCurve {
    #[serde(rename = "secp256r1")]
    Secp256r1,
    #[serde(rename = "secp384r1")]
    Secp384r1,
    #[serde(rename = "secp521r1")]
    Secp521r1,
    #[serde(rename = "brainpoolP256r1")]
    BrainpoolP256r1,
    #[serde(rename = "brainpoolP384r1")]
    BrainpoolP384r1,
    #[serde(rename = "brainpoolP512r1")]
    BrainpoolP512r1,
}

impl EcCurve {
    /// Curve name as used in circuit identities.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Secp256r1 => "secp256r1",
            Self::Secp384r1 => "secp384r1",
            Self::Secp521r1 => "secp521r1",
            Self::BrainpoolP256r1 => "brainpoolP256r1",
            Self::BrainpoolP384r1 => "brainpoolP384r1",
            Self::BrainpoolP512r1 => "brainpoolP512r1",
        }
    }

    /// Dotted named-curve OID.
    pub fn oid(&self) -> &'static str {
        match self {
            Self::Secp256r1 => "1.2.840.10045.3.1.7",
            Self::Secp384r1 => "1.3.132.0.34",
            Self::Secp521r1 => "1.3.132.0.35",
            Self::BrainpoolP256r1 => "1.3.36.3.3.2.8.1.1.7",
            Self::BrainpoolP384r1 => "1.3.36.3.3.2.8.1.1.11",
            Self::BrainpoolP512r1 => "1.3.36.3.3.2.8.1.1.13",
        }
    }

    /// Look up a curve by dotted OID.
    pub fn from_oid(oid: &str) -> Option<Self> {
        [
            Self::Secp256r1,
            Self::Secp384r1,
            Self::Secp521r1,
            Self::BrainpoolP256r1,
            Self::BrainpoolP384r1,
            Self::BrainpoolP512r1,
        ]
        .into_iter()
        .find(|c| c.oid() == oid)
    }

    /// Field size in bits.
    pub fn bits(&self) -> u32 {
        match self {
            Self::Secp256r1 | Self::BrainpoolP256r1 => 256,
            Self::Secp384r1 | Self::BrainpoolP384r1 => 384,
            Self::BrainpoolP512r1 => 512,
            Self::Secp521r1 => 521,
        }
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public key material carried by a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PublicKeyMaterial {
    /// RSA key. Both integers are big-endian with leading zeros stripped.
    Rsa {
        #[serde(with = "hex::serde")]
        modulus: Vec<u8>,
        #[serde(with = "hex::serde")]
        exponent: Vec<u8>,
    },
    /// EC key as an uncompressed or compressed SEC1 point.
    Ec {
        curve: EcCurve,
        #[serde(with = "hex::serde")]
        point: Vec<u8>,
    },
}

impl PublicKeyMaterial {
    /// Key size in bits: modulus length for RSA, field size for EC.
    pub fn bit_length(&self) -> u32 {
        match self {
            Self::Rsa { modulus, .. } => {
                let Some(first) = modulus.iter().position(|b| *b != 0) else {
                    return 0;
                };
                let significant = &modulus[first..];
                let lead_bits = 8 - significant[0].leading_zeros();
                ((significant.len() as u32 - 1) * 8) + lead_bits
            }
            Self::Ec { curve, .. } => curve.bits(),
        }
    }

    /// Curve name for EC keys, decimal public exponent for RSA keys.
    pub fn curve_or_exponent(&self) -> String {
        match self {
            Self::Rsa { exponent, .. } => {
                num_bigint::BigUint::from_bytes_be(exponent).to_string()
            }
            Self::Ec { curve, .. } => curve.as_str().to_string(),
        }
    }

    /// Whether this is an RSA key.
    pub fn is_rsa(&self) -> bool {
        matches!(self, Self::Rsa { .. })
    }
}

/// Structured certificate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Subject key identifier extension, or SHA-256 of the SPKI when absent.
    #[serde(with = "hex::serde")]
    pub key_identifier: Vec<u8>,
    /// Authority key identifier, when the extension is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_key_identifier: Option<String>,
    /// Subject distinguished name (RFC 4514 rendering).
    pub subject: String,
    /// Issuer distinguished name (RFC 4514 rendering).
    pub issuer: String,
    /// The certificate's own public key.
    pub public_key: PublicKeyMaterial,
    /// Declared signature algorithm of the issuer over this certificate.
    pub signature_algorithm: SignatureAlgorithm,
    /// Declared hash algorithm, when the signature OID names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<HashAlgorithm>,
    /// Declared PSS salt length, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt_length: Option<u32>,
    /// Raw DER of the to-be-signed portion.
    #[serde(with = "hex::serde")]
    pub tbs: Vec<u8>,
    /// Raw signature bytes over `tbs`.
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
    /// Raw DER of the whole certificate.
    #[serde(with = "hex::serde")]
    pub der: Vec<u8>,
}

impl CertificateRecord {
    /// Key size in bits.
    pub fn bit_length(&self) -> u32 {
        self.public_key.bit_length()
    }

    /// Curve name or decimal public exponent.
    pub fn curve_or_exponent(&self) -> String {
        self.public_key.curve_or_exponent()
    }

    /// Lowercase hex of the key identifier.
    pub fn key_identifier_hex(&self) -> String {
        hex::encode(&self.key_identifier)
    }
}
