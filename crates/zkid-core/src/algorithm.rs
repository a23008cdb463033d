//! # Algorithm Profiles
//!
//! An [`AlgorithmProfile`] is the fully resolved description of how a
//! signature was produced: hash, signature scheme, curve or public exponent,
//! key bit length, and (for RSA-PSS) the salt length. Circuit identities are
//! built from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Digest algorithms that appear in document signing chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Every supported hash, in the order used when searching by digest length.
    pub const ALL: [HashAlgorithm; 5] = [
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Identifier used inside circuit names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Digest length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}

/// Signature scheme tag.
///
/// `Other` carries a tag this workspace does not support (for example a
/// declared algorithm OID read from a certificate). It survives parsing so
/// that callers get a precise `UnsupportedSignatureAlgorithm` error instead
/// of a decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignatureAlgorithm {
    Rsa,
    RsaPss,
    Ecdsa,
    Other(String),
}

impl SignatureAlgorithm {
    /// Identifier used inside circuit names.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rsa => "rsa",
            Self::RsaPss => "rsapss",
            Self::Ecdsa => "ecdsa",
            Self::Other(tag) => tag,
        }
    }

    /// RSA and RSA-PSS share key material and bit-length bucketing.
    pub fn is_rsa_family(&self) -> bool {
        matches!(self, Self::Rsa | Self::RsaPss)
    }
}

impl From<String> for SignatureAlgorithm {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "rsa" => Self::Rsa,
            "rsapss" | "rsa-pss" | "rsassa-pss" => Self::RsaPss,
            "ecdsa" => Self::Ecdsa,
            _ => Self::Other(value),
        }
    }
}

impl From<SignatureAlgorithm> for String {
    fn from(value: SignatureAlgorithm) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved `(hash, signature, curve-or-exponent, bits, salt?)` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlgorithmProfile {
    /// Hash applied to the signed message.
    pub hash_algorithm: HashAlgorithm,
    /// Signature scheme.
    pub signature_algorithm: SignatureAlgorithm,
    /// Curve name for ECDSA (`secp256r1`), decimal public exponent for RSA
    /// (`65537`).
    pub curve_or_exponent: String,
    /// Key size in bits (modulus length for RSA, field size for EC).
    pub bit_length: u32,
    /// PSS salt length in bytes; `None` for non-PSS schemes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt_length: Option<u32>,
}

impl fmt::Display for AlgorithmProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.hash_algorithm, self.signature_algorithm, self.curve_or_exponent, self.bit_length
        )?;
        if let Some(salt) = self.salt_length {
            write!(f, "/salt{salt}")?;
        }
        Ok(())
    }
}
