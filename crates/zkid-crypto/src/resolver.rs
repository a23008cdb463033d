//! # Signature Algorithm Resolver
//!
//! Recovers the `(hash, scheme, curve-or-exponent, bits, salt?)` profile of a
//! signature by re-verifying it under each candidate in a fixed search order
//! and returning the first that verifies.
//!
//! ## Search order
//!
//! 1. The declared candidate, when the signed certificate declares one that
//!    fits the issuer key type.
//! 2. For RSA keys, hashes `sha256, sha1, sha384, sha512, sha224`; each hash
//!    with PKCS#1 v1.5, then PSS with salt lengths `32, 64, 48, 20, 0`.
//! 3. For EC keys, the same hash order with ECDSA.
//!
//! The order is fixed so that resolution is deterministic.
//!
//! ## Fail-fast checks
//!
//! Moduli above 4096 bits fail with `KeyLengthUnsupported`; empty signatures
//! and RSA signatures longer than the modulus fail with
//! `InvalidSignatureLength`. Both happen before any verification.
//!
//! ECDSA verification covers secp256r1 and secp384r1. Keys on the other
//! accepted curves parse but never resolve.

use p256::ecdsa::signature::hazmat::PrehashVerifier;
use rsa::{BigUint, Pkcs1v15Sign, Pss, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use tracing::{debug, info};
use zkid_core::constants::{MAX_RSA_BITS, PSS_SALT_CANDIDATES};
use zkid_core::{
    AlgorithmProfile, CertificateRecord, EcCurve, HashAlgorithm, PublicKeyMaterial,
    SignatureAlgorithm,
};

use crate::digest::{digest, HASH_SEARCH_ORDER};
use crate::error::ResolutionError;

/// One verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub hash: HashAlgorithm,
    pub scheme: Scheme,
}

/// Signature scheme of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Pkcs1v15,
    Pss { salt_length: usize },
    Ecdsa,
}

impl Candidate {
    fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self.scheme {
            Scheme::Pkcs1v15 => SignatureAlgorithm::Rsa,
            Scheme::Pss { .. } => SignatureAlgorithm::RsaPss,
            Scheme::Ecdsa => SignatureAlgorithm::Ecdsa,
        }
    }

    fn salt_length(&self) -> Option<u32> {
        match self.scheme {
            Scheme::Pss { salt_length } => Some(salt_length as u32),
            _ => None,
        }
    }

    /// The candidate a certificate declares for its own signature, if any.
    pub fn declared_by(subject: &CertificateRecord) -> Option<Self> {
        let hash = subject.hash_algorithm?;
        let scheme = match &subject.signature_algorithm {
            SignatureAlgorithm::Rsa => Scheme::Pkcs1v15,
            SignatureAlgorithm::RsaPss => Scheme::Pss {
                salt_length: subject.salt_length? as usize,
            },
            SignatureAlgorithm::Ecdsa => Scheme::Ecdsa,
            SignatureAlgorithm::Other(_) => return None,
        };
        Some(Self { hash, scheme })
    }
}

/// The full ordered candidate list for an issuer key, declared candidate
/// first and not repeated.
pub fn candidates(issuer_key: &PublicKeyMaterial, declared: Option<Candidate>) -> Vec<Candidate> {
    let mut out = Vec::new();
    let rsa = issuer_key.is_rsa();
    if let Some(d) = declared {
        if rsa != (d.scheme == Scheme::Ecdsa) {
            out.push(d);
        }
    }
    for hash in HASH_SEARCH_ORDER {
        let per_hash: Vec<Scheme> = if rsa {
            std::iter::once(Scheme::Pkcs1v15)
                .chain(
                    PSS_SALT_CANDIDATES
                        .iter()
                        .map(|&salt_length| Scheme::Pss { salt_length }),
                )
                .collect()
        } else {
            vec![Scheme::Ecdsa]
        };
        for scheme in per_hash {
            let c = Candidate { hash, scheme };
            if !out.contains(&c) {
                out.push(c);
            }
        }
    }
    out
}

/// Resolve the profile of `signature` over `message` by `issuer`.
pub fn resolve_signature(
    message: &[u8],
    signature: &[u8],
    issuer: &CertificateRecord,
    declared: Option<Candidate>,
) -> Result<AlgorithmProfile, ResolutionError> {
    let key = &issuer.public_key;
    let bits = key.bit_length();
    let verifier = Verifier::new(key, signature)?;
    let plan = candidates(key, declared);

    for candidate in &plan {
        debug!(issuer = %issuer.subject, ?candidate, "trying signature candidate");
        if verifier.verify(*candidate, message) {
            let profile = AlgorithmProfile {
                hash_algorithm: candidate.hash,
                signature_algorithm: candidate.signature_algorithm(),
                curve_or_exponent: key.curve_or_exponent(),
                bit_length: bits,
                salt_length: candidate.salt_length(),
            };
            info!(issuer = %issuer.subject, %profile, "signature algorithm resolved");
            return Ok(profile);
        }
    }

    info!(issuer = %issuer.subject, attempts = plan.len(), "signature algorithm not resolved");
    Err(ResolutionError::SignatureAlgorithmNotResolved {
        issuer: issuer.subject.clone(),
        attempts: plan.len(),
    })
}

/// Resolve how `issuer` signed the `subject` certificate.
pub fn resolve_certificate(
    subject: &CertificateRecord,
    issuer: &CertificateRecord,
) -> Result<AlgorithmProfile, ResolutionError> {
    resolve_signature(
        &subject.tbs,
        &subject.signature,
        issuer,
        Candidate::declared_by(subject),
    )
}

// ---------------------------------------------------------------------------
// Verification backends
// ---------------------------------------------------------------------------

enum Verifier<'a> {
    Rsa {
        key: RsaPublicKey,
        signature: Vec<u8>,
    },
    P256 {
        key: p256::ecdsa::VerifyingKey,
        signature: Option<p256::ecdsa::Signature>,
    },
    P384 {
        key: p384::ecdsa::VerifyingKey,
        signature: Option<p384::ecdsa::Signature>,
    },
    Unverifiable(&'a EcCurve),
}

impl<'a> Verifier<'a> {
    fn new(key: &'a PublicKeyMaterial, signature: &[u8]) -> Result<Self, ResolutionError> {
        if signature.is_empty() {
            return Err(ResolutionError::InvalidSignatureLength {
                expected: (key.bit_length() as usize).div_ceil(8),
                actual: 0,
            });
        }
        match key {
            PublicKeyMaterial::Rsa { modulus, exponent } => {
                let bits = key.bit_length();
                if bits > MAX_RSA_BITS {
                    return Err(ResolutionError::KeyLengthUnsupported {
                        bits,
                        max: MAX_RSA_BITS,
                    });
                }
                let size = (bits as usize).div_ceil(8);
                if signature.len() != size {
                    return Err(ResolutionError::InvalidSignatureLength {
                        expected: size,
                        actual: signature.len(),
                    });
                }
                let rsa_key = RsaPublicKey::new(
                    BigUint::from_bytes_be(modulus),
                    BigUint::from_bytes_be(exponent),
                )
                .map_err(|e| ResolutionError::InvalidKey(e.to_string()))?;
                Ok(Self::Rsa {
                    key: rsa_key,
                    signature: signature.to_vec(),
                })
            }
            PublicKeyMaterial::Ec { curve, point } => match curve {
                EcCurve::Secp256r1 => {
                    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
                        .map_err(|e| ResolutionError::InvalidKey(e.to_string()))?;
                    let sig = p256::ecdsa::Signature::from_der(signature)
                        .or_else(|_| p256::ecdsa::Signature::from_slice(signature))
                        .ok();
                    Ok(Self::P256 { key: vk, signature: sig })
                }
                EcCurve::Secp384r1 => {
                    let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
                        .map_err(|e| ResolutionError::InvalidKey(e.to_string()))?;
                    let sig = p384::ecdsa::Signature::from_der(signature)
                        .or_else(|_| p384::ecdsa::Signature::from_slice(signature))
                        .ok();
                    Ok(Self::P384 { key: vk, signature: sig })
                }
                other => Ok(Self::Unverifiable(other)),
            },
        }
    }

    fn verify(&self, candidate: Candidate, message: &[u8]) -> bool {
        let hashed = digest(candidate.hash, message);
        match (self, candidate.scheme) {
            (Self::Rsa { key, signature }, Scheme::Pkcs1v15) => key
                .verify(pkcs1v15_scheme(candidate.hash), &hashed, signature)
                .is_ok(),
            (Self::Rsa { key, signature }, Scheme::Pss { salt_length }) => key
                .verify(pss_scheme(candidate.hash, salt_length), &hashed, signature)
                .is_ok(),
            (Self::P256 { key, signature: Some(sig) }, Scheme::Ecdsa) => {
                key.verify_prehash(&hashed, sig).is_ok()
            }
            (Self::P384 { key, signature: Some(sig) }, Scheme::Ecdsa) => {
                key.verify_prehash(&hashed, sig).is_ok()
            }
            (Self::Unverifiable(curve), _) => {
                debug!(%curve, "no ECDSA backend for curve");
                false
            }
            _ => false,
        }
    }
}

fn pkcs1v15_scheme(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        HashAlgorithm::Sha224 => Pkcs1v15Sign::new::<Sha224>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

fn pss_scheme(hash: HashAlgorithm, salt_length: usize) -> Pss {
    match hash {
        HashAlgorithm::Sha1 => Pss::new_with_salt::<Sha1>(salt_length),
        HashAlgorithm::Sha224 => Pss::new_with_salt::<Sha224>(salt_length),
        HashAlgorithm::Sha256 => Pss::new_with_salt::<Sha256>(salt_length),
        HashAlgorithm::Sha384 => Pss::new_with_salt::<Sha384>(salt_length),
        HashAlgorithm::Sha512 => Pss::new_with_salt::<Sha512>(salt_length),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsa_key() -> PublicKeyMaterial {
        PublicKeyMaterial::Rsa {
            modulus: vec![0xff; 256],
            exponent: vec![0x01, 0x00, 0x01],
        }
    }

    #[test]
    fn rsa_candidate_order() {
        let plan = candidates(&rsa_key(), None);
        assert_eq!(plan.len(), 5 * 6);
        assert_eq!(
            plan[0],
            Candidate { hash: HashAlgorithm::Sha256, scheme: Scheme::Pkcs1v15 }
        );
        assert_eq!(
            plan[1],
            Candidate { hash: HashAlgorithm::Sha256, scheme: Scheme::Pss { salt_length: 32 } }
        );
        assert_eq!(
            plan[6],
            Candidate { hash: HashAlgorithm::Sha1, scheme: Scheme::Pkcs1v15 }
        );
        assert_eq!(plan[29].hash, HashAlgorithm::Sha224);
    }

    #[test]
    fn declared_candidate_moves_to_front() {
        let declared = Candidate { hash: HashAlgorithm::Sha512, scheme: Scheme::Pss { salt_length: 64 } };
        let plan = candidates(&rsa_key(), Some(declared));
        assert_eq!(plan[0], declared);
        assert_eq!(plan.len(), 30);
        assert_eq!(plan.iter().filter(|c| **c == declared).count(), 1);
    }

    #[test]
    fn mismatched_declared_candidate_ignored() {
        let declared = Candidate { hash: HashAlgorithm::Sha384, scheme: Scheme::Ecdsa };
        let plan = candidates(&rsa_key(), Some(declared));
        assert!(!plan.contains(&declared));
    }

    #[test]
    fn ec_candidates_are_ecdsa_only() {
        let key = PublicKeyMaterial::Ec { curve: EcCurve::Secp256r1, point: vec![4; 65] };
        let plan = candidates(&key, None);
        assert_eq!(plan.len(), 5);
        assert!(plan.iter().all(|c| c.scheme == Scheme::Ecdsa));
        assert_eq!(plan[0].hash, HashAlgorithm::Sha256);
    }

    #[test]
    fn oversize_signature_rejected() {
        let key = rsa_key();
        let err = Verifier::new(&key, &[1u8; 257]).err().unwrap();
        assert!(matches!(
            err,
            ResolutionError::InvalidSignatureLength { expected: 256, actual: 257 }
        ));
        let err = Verifier::new(&key, &[]).err().unwrap();
        assert!(matches!(err, ResolutionError::InvalidSignatureLength { actual: 0, .. }));
    }

    #[test]
    fn short_signature_rejected() {
        let key = rsa_key();
        let err = Verifier::new(&key, &[1u8; 255]).err().unwrap();
        assert!(matches!(
            err,
            ResolutionError::InvalidSignatureLength { expected: 256, actual: 255 }
        ));
        assert!(Verifier::new(&key, &[1u8; 256]).is_ok());
    }

    #[test]
    fn oversize_modulus_rejected_first() {
        let key = PublicKeyMaterial::Rsa { modulus: vec![0xff; 1024], exponent: vec![3] };
        let err = Verifier::new(&key, &[1u8; 2048]).err().unwrap();
        assert!(matches!(
            err,
            ResolutionError::KeyLengthUnsupported { bits: 8192, max: 4096 }
        ));
    }
}
