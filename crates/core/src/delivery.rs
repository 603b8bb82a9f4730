//! Delivery-range labels and the estimated-delivery policy table.

use chrono::{DateTime, Duration, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Delivery-range label quoted to the customer.
///
/// The label doubles as the estimated-delivery policy: `Express` commits to
/// the lower bound (+2 days), `Standard` to a conservative +8 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryRange {
    Express,
    Standard,
}

impl DeliveryRange {
    /// Customer-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryRange::Express => "2-4 business days",
            DeliveryRange::Standard => "6-10 business days",
        }
    }

    /// Days added to the booking time to produce the estimated delivery date.
    pub fn transit_days(&self) -> i64 {
        match self {
            DeliveryRange::Express => 2,
            DeliveryRange::Standard => 8,
        }
    }

    pub fn estimated_delivery(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        from + Duration::days(self.transit_days())
    }
}

impl Default for DeliveryRange {
    fn default() -> Self {
        DeliveryRange::Standard
    }
}

impl core::fmt::Display for DeliveryRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeliveryRange {
    type Err = DomainError;

    /// Accepts both the short policy names and the customer-facing labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "express" | "fast" | "2-4 business days" => Ok(DeliveryRange::Express),
            "standard" | "6-10 business days" => Ok(DeliveryRange::Standard),
            other => Err(DomainError::validation(format!(
                "unrecognized delivery range: {other}"
            ))),
        }
    }
}
