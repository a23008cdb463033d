//! # Key and Signature Components
//!
//! The integers a circuit consumes for a key or signature: the modulus or
//! the RSA signature as one integer, the affine `(x, y)` of an EC point, and
//! `(r, s)` of an ECDSA signature. Circuit input builders split these into
//! fixed-width limbs.

use num_bigint::BigUint;
use zkid_core::{EcCurve, PublicKeyMaterial};

use crate::error::ResolutionError;

/// `[modulus]` for RSA keys, `[x, y]` for EC keys.
pub fn public_key_components(key: &PublicKeyMaterial) -> Result<Vec<BigUint>, ResolutionError> {
    match key {
        PublicKeyMaterial::Rsa { modulus, .. } => Ok(vec![BigUint::from_bytes_be(modulus)]),
        PublicKeyMaterial::Ec { curve, point } => {
            let uncompressed = uncompressed_point(*curve, point)?;
            let coord = (uncompressed.len() - 1) / 2;
            Ok(vec![
                BigUint::from_bytes_be(&uncompressed[1..=coord]),
                BigUint::from_bytes_be(&uncompressed[1 + coord..]),
            ])
        }
    }
}

fn uncompressed_point(curve: EcCurve, point: &[u8]) -> Result<Vec<u8>, ResolutionError> {
    let coord = (curve.bits() as usize).div_ceil(8);
    if point.len() == 1 + 2 * coord && point.first() == Some(&0x04) {
        return Ok(point.to_vec());
    }
    let invalid = |e: &dyn std::fmt::Display| ResolutionError::InvalidKey(format!("{curve}: {e}"));
    match curve {
        EcCurve::Secp256r1 => p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
            .map(|vk| vk.to_encoded_point(false).as_bytes().to_vec())
            .map_err(|e| invalid(&e)),
        EcCurve::Secp384r1 => p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
            .map(|vk| vk.to_encoded_point(false).as_bytes().to_vec())
            .map_err(|e| invalid(&e)),
        _ => Err(invalid(&"compressed points are only decoded on secp256r1 and secp384r1")),
    }
}

/// `[s]` for RSA signatures, `[r, s]` for ECDSA signatures (DER or fixed
/// width).
pub fn signature_components(
    key: &PublicKeyMaterial,
    signature: &[u8],
) -> Result<Vec<BigUint>, ResolutionError> {
    let invalid = |e: &dyn std::fmt::Display| ResolutionError::InvalidKey(format!("signature: {e}"));
    match key {
        PublicKeyMaterial::Rsa { .. } => Ok(vec![BigUint::from_bytes_be(signature)]),
        PublicKeyMaterial::Ec { curve: EcCurve::Secp256r1, .. } => {
            let sig = p256::ecdsa::Signature::from_der(signature)
                .or_else(|_| p256::ecdsa::Signature::from_slice(signature))
                .map_err(|e| invalid(&e))?;
            let (r, s) = sig.split_bytes();
            Ok(vec![BigUint::from_bytes_be(&r), BigUint::from_bytes_be(&s)])
        }
        PublicKeyMaterial::Ec { curve: EcCurve::Secp384r1, .. } => {
            let sig = p384::ecdsa::Signature::from_der(signature)
                .or_else(|_| p384::ecdsa::Signature::from_slice(signature))
                .map_err(|e| invalid(&e))?;
            let (r, s) = sig.split_bytes();
            Ok(vec![BigUint::from_bytes_be(&r), BigUint::from_bytes_be(&s)])
        }
        PublicKeyMaterial::Ec { curve, .. } => Err(invalid(&format!("ECDSA on {curve} is not supported"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsa_components_are_single_integers() {
        let key = PublicKeyMaterial::Rsa {
            modulus: vec![0x01, 0x00],
            exponent: vec![0x03],
        };
        assert_eq!(public_key_components(&key).unwrap(), vec![BigUint::from(256u32)]);
        assert_eq!(
            signature_components(&key, &[0x00, 0x05]).unwrap(),
            vec![BigUint::from(5u32)]
        );
    }

    #[test]
    fn uncompressed_point_splits_into_coordinates() {
        let mut point = vec![0x04];
        point.extend([0x11; 32]);
        point.extend([0x22; 32]);
        let key = PublicKeyMaterial::Ec {
            curve: EcCurve::Secp256r1,
            point,
        };
        let xy = public_key_components(&key).unwrap();
        assert_eq!(xy[0], BigUint::from_bytes_be(&[0x11; 32]));
        assert_eq!(xy[1], BigUint::from_bytes_be(&[0x22; 32]));
    }

    #[test]
    fn brainpool_signatures_not_decoded() {
        let key = PublicKeyMaterial::Ec {
            curve: EcCurve::BrainpoolP256r1,
            point: vec![0x04; 65],
        };
        assert!(matches!(
            signature_components(&key, &[0x30, 0x00]),
            Err(ResolutionError::InvalidKey(_))
        ));
    }
}
