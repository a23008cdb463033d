//! # Country Codes
//!
//! Three-character country codes as they appear in MRZ nationality and
//! issuing-state fields (ISO 3166-1 alpha-3 plus the ICAO extensions such as
//! `D<<` for Germany). Only constructible through [`CountryCode::new`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::COUNTRY_CODE_LEN;
use crate::error::ZkidError;

/// A validated three-character country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate a country code: exactly three printable ASCII characters.
    pub fn new(code: &str) -> Result<Self, ZkidError> {
        if code.len() != COUNTRY_CODE_LEN || !code.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ZkidError::InvalidParameter(format!(
                "country code must be exactly {COUNTRY_CODE_LEN} printable ASCII characters, got {code:?}"
            )));
        }
        Ok(Self(code.to_string()))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The code as its three ASCII bytes.
    pub fn as_bytes(&self) -> [u8; COUNTRY_CODE_LEN] {
        let b = self.0.as_bytes();
        [b[0], b[1], b[2]]
    }
}

impl FromStr for CountryCode {
    type Err = ZkidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ZkidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
