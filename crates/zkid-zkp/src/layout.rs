//! # Reveal Buffer Layouts
//!
//! Each attestation category reveals a fixed-width byte buffer. The tables
//! below name every byte range of that buffer. Ranges are inclusive, never
//! overlap, and together cover the whole buffer:
//!
//! | Category  | Bytes | Composition                                  |
//! |-----------|-------|----------------------------------------------|
//! | passport  | 93    | TD3 MRZ (88) + minimum age (2) + OFAC (3)    |
//! | id card   | 94    | TD1 MRZ (90) + minimum age (2) + OFAC (2)    |
//! | QR        | 119   | personal fields (116) + OFAC (2) + age (1)   |
//!
//! Ranges with no [`Attribute`] are structural (document code, check
//! digits, optional data) and are never selected.
//!
//! ## Selector
//!
//! The selector sets bit `i` for each byte `i` of a selected attribute. The
//! minimum-age range is always revealed by the circuit and contributes no
//! bits.

use std::fmt;
use std::ops::RangeInclusive;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zkid_core::constants::MRZ_FILLER;
use zkid_core::AttestationCategory;

use crate::error::CodecError;

/// A disclosable personal attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    IssuingState,
    Name,
    /// Passport or card number; the id-number tail for QR credentials.
    DocumentNumber,
    Nationality,
    DateOfBirth,
    Gender,
    ExpiryDate,
    Pincode,
    State,
    PhoneNumber,
    Ofac,
    MinimumAge,
}

impl Attribute {
    pub const ALL: [Attribute; 12] = [
        Self::IssuingState,
        Self::Name,
        Self::DocumentNumber,
        Self::Nationality,
        Self::DateOfBirth,
        Self::Gender,
        Self::ExpiryDate,
        Self::Pincode,
        Self::State,
        Self::PhoneNumber,
        Self::Ofac,
        Self::MinimumAge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IssuingState => "issuing_state",
            Self::Name => "name",
            Self::DocumentNumber => "document_number",
            Self::Nationality => "nationality",
            Self::DateOfBirth => "date_of_birth",
            Self::Gender => "gender",
            Self::ExpiryDate => "expiry_date",
            Self::Pincode => "pincode",
            Self::State => "state",
            Self::PhoneNumber => "phone_number",
            Self::Ofac => "ofac",
            Self::MinimumAge => "minimum_age",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown attribute: {s}"))
    }
}

/// One named range of a reveal buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutField {
    pub name: &'static str,
    pub attribute: Option<Attribute>,
    pub start: usize,
    /// Inclusive.
    pub end: usize,
}

impl LayoutField {
    const fn attr(attribute: Attribute, start: usize, end: usize) -> Self {
        Self {
            name: "",
            attribute: Some(attribute),
            start,
            end,
        }
    }

    const fn fixed(name: &'static str, start: usize, end: usize) -> Self {
        Self {
            name,
            attribute: None,
            start,
            end,
        }
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Attribute name, or the structural name for unselectable ranges.
    pub fn label(&self) -> &'static str {
        self.attribute.map_or(self.name, |a| a.as_str())
    }
}

/// The reveal buffer layout of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub category: AttestationCategory,
    pub len: usize,
    pub fields: &'static [LayoutField],
    /// Bytes carried by each public signal, first signal first.
    pub chunk_widths: &'static [usize],
}

use Attribute::*;

const PASSPORT_FIELDS: [LayoutField; 15] = [
    LayoutField::fixed("document_code", 0, 1),
    LayoutField::attr(IssuingState, 2, 4),
    LayoutField::attr(Name, 5, 43),
    LayoutField::attr(DocumentNumber, 44, 52),
    LayoutField::fixed("document_number_check", 53, 53),
    LayoutField::attr(Nationality, 54, 56),
    LayoutField::attr(DateOfBirth, 57, 62),
    LayoutField::fixed("date_of_birth_check", 63, 63),
    LayoutField::attr(Gender, 64, 64),
    LayoutField::attr(ExpiryDate, 65, 70),
    LayoutField::fixed("expiry_date_check", 71, 71),
    LayoutField::fixed("optional_data", 72, 86),
    LayoutField::fixed("composite_check", 87, 87),
    LayoutField::attr(MinimumAge, 88, 89),
    LayoutField::attr(Ofac, 90, 92),
];

const ID_CARD_FIELDS: [LayoutField; 16] = [
    LayoutField::fixed("document_code", 0, 1),
    LayoutField::attr(IssuingState, 2, 4),
    LayoutField::attr(DocumentNumber, 5, 13),
    LayoutField::fixed("document_number_check", 14, 14),
    LayoutField::fixed("optional_data", 15, 29),
    LayoutField::attr(DateOfBirth, 30, 35),
    LayoutField::fixed("date_of_birth_check", 36, 36),
    LayoutField::attr(Gender, 37, 37),
    LayoutField::attr(ExpiryDate, 38, 43),
    LayoutField::fixed("expiry_date_check", 44, 44),
    LayoutField::attr(Nationality, 45, 47),
    LayoutField::fixed("optional_data_2", 48, 58),
    LayoutField::fixed("composite_check", 59, 59),
    LayoutField::attr(Name, 60, 89),
    LayoutField::attr(MinimumAge, 90, 91),
    LayoutField::attr(Ofac, 92, 93),
];

const QR_FIELDS: [LayoutField; 9] = [
    LayoutField::attr(Gender, 0, 0),
    LayoutField::attr(DateOfBirth, 1, 8),
    LayoutField::attr(Name, 9, 70),
    LayoutField::attr(DocumentNumber, 71, 74),
    LayoutField::attr(Pincode, 75, 80),
    LayoutField::attr(State, 81, 111),
    LayoutField::attr(PhoneNumber, 112, 115),
    LayoutField::attr(Ofac, 116, 117),
    LayoutField::attr(MinimumAge, 118, 118),
];

static PASSPORT: Layout = Layout {
    category: AttestationCategory::Passport,
    len: 93,
    fields: &PASSPORT_FIELDS,
    chunk_widths: &[31, 31, 31],
};

static ID_CARD: Layout = Layout {
    category: AttestationCategory::IdCard,
    len: 94,
    fields: &ID_CARD_FIELDS,
    chunk_widths: &[31, 31, 31, 1],
};

static NATIONAL_QR: Layout = Layout {
    category: AttestationCategory::NationalQr,
    len: 119,
    fields: &QR_FIELDS,
    chunk_widths: &[31, 31, 31, 26],
};

/// Layout table for `category`.
pub fn layout(category: AttestationCategory) -> &'static Layout {
    match category {
        AttestationCategory::Passport => &PASSPORT,
        AttestationCategory::IdCard => &ID_CARD,
        AttestationCategory::NationalQr => &NATIONAL_QR,
    }
}

impl Layout {
    /// Range of `attribute`, if this category carries it.
    pub fn field(&self, attribute: Attribute) -> Option<&LayoutField> {
        self.fields.iter().find(|f| f.attribute == Some(attribute))
    }

    /// Number of public signals carrying the buffer.
    pub fn signal_count(&self) -> usize {
        self.chunk_widths.len()
    }

    /// Raw bytes of `attribute` in `buffer`.
    pub fn slice<'a>(&self, buffer: &'a [u8], attribute: Attribute) -> Result<&'a [u8], CodecError> {
        self.check_len(buffer)?;
        let field = self.field(attribute).ok_or(CodecError::AttributeNotDisclosable {
            attribute,
            category: self.category,
        })?;
        Ok(&buffer[field.range()])
    }

    /// `attribute` as text with NUL padding stripped. Names are additionally
    /// cleaned of MRZ filler.
    pub fn extract(&self, buffer: &[u8], attribute: Attribute) -> Result<String, CodecError> {
        let raw: String = self
            .slice(buffer, attribute)?
            .iter()
            .filter(|&&b| b != 0)
            .map(|&b| b as char)
            .collect();
        Ok(match attribute {
            Name => clean_name(&raw),
            _ => raw,
        })
    }

    /// Selector bitmap for `attributes`.
    pub fn selector(&self, attributes: &[Attribute]) -> Result<BigUint, CodecError> {
        let mut selector = BigUint::default();
        for &attribute in attributes {
            if attribute == MinimumAge {
                continue;
            }
            let field = self.field(attribute).ok_or(CodecError::AttributeNotDisclosable {
                attribute,
                category: self.category,
            })?;
            for bit in field.range() {
                selector.set_bit(bit as u64, true);
            }
        }
        Ok(selector)
    }

    /// Attributes whose ranges are fully set in `selector`.
    pub fn selected(&self, selector: &BigUint) -> Vec<Attribute> {
        self.fields
            .iter()
            .filter_map(|f| {
                let attribute = f.attribute.filter(|a| *a != MinimumAge)?;
                f.range()
                    .all(|bit| selector.bit(bit as u64))
                    .then_some(attribute)
            })
            .collect()
    }

    fn check_len(&self, buffer: &[u8]) -> Result<(), CodecError> {
        if buffer.len() != self.len {
            return Err(CodecError::BufferLength {
                category: self.category,
                expected: self.len,
                actual: buffer.len(),
            });
        }
        Ok(())
    }
}

/// Turn an MRZ name field into display form: `ERIKSSON<<ANNA<MARIA<<<`
/// becomes `ERIKSSON ANNA MARIA`.
pub fn clean_name(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == MRZ_FILLER {
            let run_end = chars[i..]
                .iter()
                .position(|&x| x != MRZ_FILLER)
                .map_or(chars.len(), |p| i + p);
            let joins_words = out.chars().last().is_some_and(|p| p.is_ascii_uppercase())
                && chars.get(run_end).is_some_and(|n| n.is_ascii_uppercase());
            if joins_words {
                out.push(' ');
            }
            i = run_end;
            continue;
        }
        out.push(c);
        i += 1;
    }
    out.trim().to_string()
}
