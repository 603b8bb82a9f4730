//! Human-readable unique codes: tracking codes and invoice numbers.

use chrono::{DateTime, Datelike, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Shipment tracking code, e.g. `DVX-2026-A9F3C21D`.
///
/// Globally unique and immutable once assigned. Uniqueness is ultimately the
/// store's job (unique index); generation is merely collision-resistant, so
/// callers retry on the rare duplicate-key error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingCode(String);

/// Invoice number, e.g. `INV-2026-7B2E90AC`. Same shape and uniqueness rules
/// as the tracking code, different prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

/// 8-char token: first segment of a UUIDv4, uppercased.
fn random_token() -> String {
    Uuid::new_v4()
        .to_string()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

fn validate_code(s: &str, prefix: &str) -> Result<(), DomainError> {
    let mut parts = s.split('-');
    let (p, year, token) = (parts.next(), parts.next(), parts.next());
    let well_formed = p == Some(prefix)
        && year.map(|y| y.len() == 4 && y.chars().all(|c| c.is_ascii_digit())) == Some(true)
        && token.map(|t| t.len() == 8 && t.chars().all(|c| c.is_ascii_alphanumeric()))
            == Some(true)
        && parts.next().is_none();
    if well_formed {
        Ok(())
    } else {
        Err(DomainError::invalid_id(format!(
            "malformed {prefix} code: {s}"
        )))
    }
}

impl TrackingCode {
    pub const PREFIX: &'static str = "DVX";

    /// Generate a fresh code stamped with the year of `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self(format!("{}-{}-{}", Self::PREFIX, now.year(), random_token()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl InvoiceNumber {
    pub const PREFIX: &'static str = "INV";

    pub fn generate(now: DateTime<Utc>) -> Self {
        Self(format!("{}-{}-{}", Self::PREFIX, now.year(), random_token()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TrackingCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        validate_code(s, Self::PREFIX)?;
        Ok(Self(s.to_string()))
    }
}

impl FromStr for InvoiceNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        validate_code(s, Self::PREFIX)?;
        Ok(Self(s.to_string()))
    }
}
