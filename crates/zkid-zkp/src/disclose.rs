//! # Disclosure Output
//!
//! Reads the public signals of a disclosure proof back into named
//! attributes. Signal positions differ per category:
//!
//! | Signal                  | passport | id card | QR |
//! |-------------------------|----------|---------|----|
//! | revealed data (first)   | 0        | 0       | 2  |
//! | forbidden list (first)  | 3        | 4       | 6  |
//! | nullifier               | 7        | 8       | 0  |
//! | attestation id          | 8        | 9       | 10 |
//! | registration root       | 9        | 10      | 16 |
//! | current date (first)    | 10       | 11      | 11 |
//! | scope                   | 19       | 19      | 17 |
//! | user identifier         | 20       | 20      | 18 |
//!
//! Passport-like circuits emit the current date as six single-digit
//! signals (`YYMMDD`); the QR circuit emits year, month and day as three
//! signals.
//!
//! [`validate_disclosure`] checks a decoded disclosure against what a
//! verifier asked for and returns every mismatch.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use zkid_core::{AttestationCategory, CountryCode, FieldElement};

use crate::codec::{unpack_category, unpack_countries};
use crate::error::CodecError;
use crate::layout::{layout, Attribute};

/// Public-signal positions of one disclosure circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalIndices {
    pub revealed_data: usize,
    pub forbidden_countries: usize,
    pub nullifier: usize,
    pub attestation_id: usize,
    pub merkle_root: usize,
    pub current_date: usize,
    pub scope: usize,
    pub user_identifier: usize,
}

/// Signal positions for `category`.
pub fn signal_indices(category: AttestationCategory) -> SignalIndices {
    match category {
        AttestationCategory::Passport => SignalIndices {
            revealed_data: 0,
            forbidden_countries: 3,
            nullifier: 7,
            attestation_id: 8,
            merkle_root: 9,
            current_date: 10,
            scope: 19,
            user_identifier: 20,
        },
        AttestationCategory::IdCard => SignalIndices {
            revealed_data: 0,
            forbidden_countries: 4,
            nullifier: 8,
            attestation_id: 9,
            merkle_root: 10,
            current_date: 11,
            scope: 19,
            user_identifier: 20,
        },
        AttestationCategory::NationalQr => SignalIndices {
            revealed_data: 2,
            forbidden_countries: 6,
            nullifier: 0,
            attestation_id: 10,
            merkle_root: 16,
            current_date: 11,
            scope: 17,
            user_identifier: 18,
        },
    }
}

/// Attributes recovered from a disclosure proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureOutput {
    pub nullifier: String,
    pub forbidden_countries_list_packed: Vec<String>,
    pub forbidden_countries: Vec<String>,
    pub issuing_state: String,
    pub name: String,
    pub id_number: String,
    pub nationality: String,
    pub date_of_birth: String,
    pub gender: String,
    pub expiry_date: String,
    pub minimum_age: String,
    /// Date the proof was generated for, as `YYYYMMDD`.
    pub current_date: String,
    /// One flag per sanctions list; `true` when the list check passed.
    pub ofac: Vec<bool>,
    pub scope: String,
    pub user_identifier: String,
}

fn signal<'a>(signals: &'a [String], index: usize) -> Result<&'a str, CodecError> {
    signals
        .get(index)
        .map(String::as_str)
        .ok_or(CodecError::MissingSignal {
            index,
            len: signals.len(),
        })
}

fn current_date_text(category: AttestationCategory, signals: &[String]) -> Result<String, CodecError> {
    let start = signal_indices(category).current_date;
    let digits = |range: std::ops::Range<usize>| -> Result<String, CodecError> {
        let mut text = String::new();
        for i in range {
            text.extend(signal(signals, start + i)?.chars().filter(char::is_ascii_digit));
        }
        Ok(text)
    };
    let (year, month, day) = if category.is_passport_like() {
        (format!("20{}", digits(0..2)?), digits(2..4)?, digits(4..6)?)
    } else {
        (digits(0..1)?, digits(1..2)?, digits(2..3)?)
    };
    let number = |text: &str| text.parse::<u64>().unwrap_or(0);
    Ok(format!("{:04}{:02}{:02}", number(&year), number(&month), number(&day)))
}

/// Revealed bytes of a disclosure proof.
pub fn revealed_data_bytes(category: AttestationCategory, signals: &[String]) -> Result<Vec<u8>, CodecError> {
    let start = signal_indices(category).revealed_data;
    let count = layout(category).signal_count();
    let elements = (start..start + count)
        .map(|i| Ok(signal(signals, i)?.parse::<FieldElement>()?))
        .collect::<Result<Vec<_>, CodecError>>()?;
    Ok(unpack_category(category, &elements))
}

/// Decode the public signals of a disclosure proof.
pub fn format_revealed_data(
    category: AttestationCategory,
    signals: &[String],
) -> Result<DisclosureOutput, CodecError> {
    let indices = signal_indices(category);
    let l = layout(category);
    let buffer = revealed_data_bytes(category, signals)?;
    let read = |attribute| l.extract(&buffer, attribute);
    let qr = category == AttestationCategory::NationalQr;

    let packed: Vec<String> = (indices.forbidden_countries..indices.forbidden_countries + 4)
        .map(|i| signal(signals, i).map(str::to_string))
        .collect::<Result<_, _>>()?;
    let packed_elements = packed
        .iter()
        .map(|s| s.parse::<FieldElement>())
        .collect::<Result<Vec<_>, _>>()?;

    let date_of_birth = if qr {
        l.slice(&buffer, Attribute::DateOfBirth)?
            .iter()
            .map(u8::to_string)
            .collect()
    } else {
        read(Attribute::DateOfBirth)?
    };
    let minimum_age = if qr {
        format!("{:02}", l.slice(&buffer, Attribute::MinimumAge)?[0])
    } else {
        read(Attribute::MinimumAge)?
    };
    let mut ofac: Vec<bool> = l
        .slice(&buffer, Attribute::Ofac)?
        .iter()
        .map(|&b| b == 0)
        .collect();
    if ofac.len() < 3 {
        ofac.insert(0, false);
    }

    Ok(DisclosureOutput {
        nullifier: signal(signals, indices.nullifier)?.to_string(),
        forbidden_countries: unpack_countries(&packed_elements),
        forbidden_countries_list_packed: packed,
        issuing_state: if qr { read(Attribute::State)? } else { read(Attribute::IssuingState)? },
        name: read(Attribute::Name)?,
        id_number: read(Attribute::DocumentNumber)?,
        nationality: if qr { "IND".to_string() } else { read(Attribute::Nationality)? },
        date_of_birth,
        gender: read(Attribute::Gender)?,
        expiry_date: if qr { "UNAVAILABLE".to_string() } else { read(Attribute::ExpiryDate)? },
        minimum_age,
        current_date: current_date_text(category, signals)?,
        ofac,
        scope: signal(signals, indices.scope)?.to_string(),
        user_identifier: signal(signals, indices.user_identifier)?.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// What a verifier requires of a disclosure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationConfig {
    /// Required minimum age; `None` or `0` disables the check.
    #[serde(default)]
    pub minimum_age: Option<u8>,
    /// Countries the circuit's forbidden list must contain.
    #[serde(default)]
    pub excluded_countries: Vec<CountryCode>,
}

/// One way a disclosure disagrees with a [`VerificationConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfigIssue {
    /// An excluded country is missing from the circuit's forbidden list.
    #[error("forbidden countries [{}] do not cover {missing}", .circuit.join(", "))]
    ForbiddenCountriesMismatch {
        circuit: Vec<String>,
        missing: String,
    },
    /// The revealed minimum age is neither the configured age nor `00`.
    #[error("minimum age {circuit:?} does not match the configured {config}")]
    MinimumAgeMismatch { circuit: String, config: u8 },
    /// The circuit date is not a calendar date.
    #[error("circuit date {date:?} is not a valid date")]
    InvalidTimestamp { date: String },
    /// The circuit date is more than a day ahead of now.
    #[error("circuit date {date} is in the future")]
    TimestampInFuture { date: NaiveDate },
    /// The circuit date ended more than a day before now.
    #[error("circuit date {date} is too old")]
    TimestampTooOld { date: NaiveDate },
}

/// Check a decoded disclosure against `config` at time `now`.
///
/// Returns an empty list when the disclosure is acceptable. The circuit
/// date is accepted from one day before `now` (counting to the end of the
/// circuit's day) until one day after it.
pub fn validate_disclosure(
    output: &DisclosureOutput,
    config: &VerificationConfig,
    now: DateTime<Utc>,
) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if let Some(missing) = config
        .excluded_countries
        .iter()
        .find(|c| !output.forbidden_countries.iter().any(|f| f == c.as_str()))
    {
        issues.push(ConfigIssue::ForbiddenCountriesMismatch {
            circuit: output.forbidden_countries.clone(),
            missing: missing.to_string(),
        });
    }

    if let Some(age) = config.minimum_age.filter(|&a| a > 0) {
        let revealed = output.minimum_age.as_str();
        if revealed != "00" && revealed.parse::<u8>().ok() != Some(age) {
            issues.push(ConfigIssue::MinimumAgeMismatch {
                circuit: revealed.to_string(),
                config: age,
            });
        }
    }

    let midnight = NaiveDate::parse_from_str(&output.current_date, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0));
    match midnight {
        None => issues.push(ConfigIssue::InvalidTimestamp {
            date: output.current_date.clone(),
        }),
        Some(midnight) => {
            let start = midnight.and_utc();
            let end_of_day = start + Duration::seconds(24 * 60 * 60 - 1);
            if start > now + Duration::days(1) {
                issues.push(ConfigIssue::TimestampInFuture { date: midnight.date() });
            }
            if end_of_day < now - Duration::days(1) {
                issues.push(ConfigIssue::TimestampTooOld { date: midnight.date() });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{pack_countries, pack_reveal};

    fn signals_with(category: AttestationCategory, buffer: &[u8], total: usize) -> Vec<String> {
        let indices = signal_indices(category);
        let mut signals = vec!["0".to_string(); total];
        for (i, e) in pack_reveal(category, buffer).unwrap().iter().enumerate() {
            signals[indices.revealed_data + i] = e.to_decimal();
        }
        let countries = pack_countries(&["PRK", "IRN"]).unwrap();
        for (i, e) in countries.elements.iter().enumerate() {
            signals[indices.forbidden_countries + i] = e.to_decimal();
        }
        signals[indices.nullifier] = "777".into();
        signals[indices.scope] = "42".into();
        signals
    }

    #[test]
    fn passport_signals_decode() {
        let mut buffer = b"P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<L898902C36UTO7408122F1204159ZE184226B<<<<<10".to_vec();
        buffer.extend(b"18");
        buffer.extend([0, 0, 1]);
        let signals = signals_with(AttestationCategory::Passport, &buffer, 21);
        let out = format_revealed_data(AttestationCategory::Passport, &signals).unwrap();
        assert_eq!(out.issuing_state, "UTO");
        assert_eq!(out.name, "ERIKSSON ANNA MARIA");
        assert_eq!(out.id_number, "L898902C3");
        assert_eq!(out.nationality, "UTO");
        assert_eq!(out.date_of_birth, "740812");
        assert_eq!(out.gender, "F");
        assert_eq!(out.expiry_date, "120415");
        assert_eq!(out.minimum_age, "18");
        assert_eq!(out.ofac, vec![true, true, false]);
        assert_eq!(out.forbidden_countries, vec!["PRK", "IRN"]);
        assert_eq!(out.nullifier, "777");
        assert_eq!(out.scope, "42");
    }

    #[test]
    fn undisclosed_fields_decode_empty() {
        let mut buffer = vec![0u8; 94];
        buffer[60..64].copy_from_slice(b"DOE<");
        let signals = signals_with(AttestationCategory::IdCard, &buffer, 21);
        let out = format_revealed_data(AttestationCategory::IdCard, &signals).unwrap();
        assert_eq!(out.name, "DOE");
        assert_eq!(out.issuing_state, "");
        assert_eq!(out.ofac, vec![false, true, true]);
    }

    #[test]
    fn qr_signals_decode() {
        let mut buffer = vec![0u8; 119];
        buffer[0] = b'F';
        buffer[1..9].copy_from_slice(&[1, 9, 8, 4, 0, 6, 1, 2]);
        buffer[9..17].copy_from_slice(b"Asha Rao");
        buffer[81..90].copy_from_slice(b"Karnataka");
        buffer[116] = 0;
        buffer[117] = 1;
        buffer[118] = 18;
        let signals = signals_with(AttestationCategory::NationalQr, &buffer, 19);
        let out = format_revealed_data(AttestationCategory::NationalQr, &signals).unwrap();
        assert_eq!(out.name, "Asha Rao");
        assert_eq!(out.date_of_birth, "19840612");
        assert_eq!(out.nationality, "IND");
        assert_eq!(out.expiry_date, "UNAVAILABLE");
        assert_eq!(out.issuing_state, "Karnataka");
        assert_eq!(out.minimum_age, "18");
        assert_eq!(out.ofac, vec![false, true, false]);
        assert_eq!(out.nullifier, "777");
    }

    fn passport_output(minimum_age: &[u8; 2], date: &str) -> DisclosureOutput {
        let mut buffer = b"P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<L898902C36UTO7408122F1204159ZE184226B<<<<<10".to_vec();
        buffer.extend(minimum_age);
        buffer.extend([0, 0, 0]);
        let mut signals = signals_with(AttestationCategory::Passport, &buffer, 21);
        let start = signal_indices(AttestationCategory::Passport).current_date;
        for (i, digit) in date.chars().enumerate() {
            signals[start + i] = digit.to_string();
        }
        format_revealed_data(AttestationCategory::Passport, &signals).unwrap()
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn config(age: Option<u8>, countries: &[&str]) -> VerificationConfig {
        VerificationConfig {
            minimum_age: age,
            excluded_countries: countries.iter().map(|c| CountryCode::new(c).unwrap()).collect(),
        }
    }

    #[test]
    fn passport_current_date_decodes() {
        assert_eq!(passport_output(b"18", "240612").current_date, "20240612");
    }

    #[test]
    fn qr_current_date_reads_three_signals() {
        let mut signals = signals_with(AttestationCategory::NationalQr, &[0u8; 119], 19);
        signals[11] = "2024".into();
        signals[12] = "6".into();
        signals[13] = "12".into();
        let out = format_revealed_data(AttestationCategory::NationalQr, &signals).unwrap();
        assert_eq!(out.current_date, "20240612");
        signals[12] = "06".into();
        let out = format_revealed_data(AttestationCategory::NationalQr, &signals).unwrap();
        assert_eq!(out.current_date, "20240612");
    }

    #[test]
    fn matching_disclosure_has_no_issues() {
        let out = passport_output(b"18", "240612");
        let issues = validate_disclosure(&out, &config(Some(18), &["PRK", "IRN"]), noon(2024, 6, 12));
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn excluded_country_missing_from_circuit_list() {
        let out = passport_output(b"18", "240612");
        let issues = validate_disclosure(&out, &config(None, &["PRK", "CUB"]), noon(2024, 6, 12));
        assert_eq!(
            issues,
            vec![ConfigIssue::ForbiddenCountriesMismatch {
                circuit: vec!["PRK".into(), "IRN".into()],
                missing: "CUB".into(),
            }]
        );
    }

    #[test]
    fn minimum_age_must_match_config() {
        let out = passport_output(b"18", "240612");
        let issues = validate_disclosure(&out, &config(Some(21), &[]), noon(2024, 6, 12));
        assert_eq!(
            issues,
            vec![ConfigIssue::MinimumAgeMismatch { circuit: "18".into(), config: 21 }]
        );
        assert!(validate_disclosure(&out, &config(Some(0), &[]), noon(2024, 6, 12)).is_empty());
    }

    #[test]
    fn unchecked_minimum_age_is_accepted() {
        let out = passport_output(b"00", "240612");
        assert_eq!(out.minimum_age, "00");
        assert!(validate_disclosure(&out, &config(Some(21), &[]), noon(2024, 6, 12)).is_empty());
    }

    #[test]
    fn circuit_date_window() {
        let now = noon(2024, 6, 12);
        let cfg = VerificationConfig::default();
        for ok in ["240611", "240612", "240613"] {
            assert!(validate_disclosure(&passport_output(b"18", ok), &cfg, now).is_empty(), "{ok}");
        }
        assert_eq!(
            validate_disclosure(&passport_output(b"18", "240614"), &cfg, now),
            vec![ConfigIssue::TimestampInFuture {
                date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
            }]
        );
        assert_eq!(
            validate_disclosure(&passport_output(b"18", "240610"), &cfg, now),
            vec![ConfigIssue::TimestampTooOld {
                date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
            }]
        );
    }

    #[test]
    fn impossible_circuit_date_is_reported() {
        let out = passport_output(b"18", "241332");
        assert_eq!(
            validate_disclosure(&out, &VerificationConfig::default(), noon(2024, 6, 12)),
            vec![ConfigIssue::InvalidTimestamp { date: "20241332".into() }]
        );
    }

    #[test]
    fn short_signal_array_rejected() {
        let signals = vec!["0".to_string(); 5];
        assert_eq!(
            format_revealed_data(AttestationCategory::Passport, &signals),
            Err(CodecError::MissingSignal { index: 5, len: 5 })
        );
    }

    #[test]
    fn non_numeric_signal_rejected() {
        let mut signals = vec!["0".to_string(); 21];
        signals[1] = "abc".into();
        assert!(matches!(
            format_revealed_data(AttestationCategory::Passport, &signals),
            Err(CodecError::InvalidSignal(_))
        ));
    }
}
