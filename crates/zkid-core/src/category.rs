//! # Attestation Categories
//!
//! The attestation category distinguishes passport, ID-card and national QR
//! credential proof contexts. Its numeric id is folded into commitments and
//! nullifiers and appears as a public signal in disclosure proofs.

use serde::{Deserialize, Serialize};

/// Proof context tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationCategory {
    /// ICAO 9303 TD3 passport (88-character MRZ).
    Passport,
    /// ICAO 9303 TD1 identity card (90-character MRZ).
    IdCard,
    /// QR-based national identity credential.
    NationalQr,
}

impl AttestationCategory {
    /// All categories, in attestation-id order.
    pub const ALL: [AttestationCategory; 3] = [Self::Passport, Self::IdCard, Self::NationalQr];

    /// Numeric attestation id used in hashes and public signals.
    pub fn attestation_id(&self) -> u64 {
        match self {
            Self::Passport => 1,
            Self::IdCard => 2,
            Self::NationalQr => 3,
        }
    }

    /// Inverse of [`attestation_id`](Self::attestation_id).
    pub fn from_attestation_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(Self::Passport),
            2 => Some(Self::IdCard),
            3 => Some(Self::NationalQr),
            _ => None,
        }
    }

    /// Stable lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::IdCard => "id_card",
            Self::NationalQr => "national_qr",
        }
    }

    /// Whether documents of this category carry an MRZ and a certificate chain.
    pub fn is_passport_like(&self) -> bool {
        matches!(self, Self::Passport | Self::IdCard)
    }
}

impl std::fmt::Display for AttestationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
