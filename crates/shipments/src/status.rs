use core::str::FromStr;
use serde::{Deserialize, Serialize};

use dovic_core::DomainError;

/// Shipment status, shared by the shipment record and every tracking event.
///
/// `Booked`, `Picked Up` and `Delivered` are once-only milestones: each may
/// appear at most once in a shipment's ledger and is set only by the
/// specialized creation / pickup / delivery paths. The rest are repeatable
/// in-transit progress updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    Booked,
    #[serde(rename = "Picked Up")]
    PickedUp,
    #[serde(rename = "In Transit")]
    InTransit,
    #[serde(rename = "Customs Clearance")]
    CustomsClearance,
    #[serde(rename = "On Hold")]
    OnHold,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 7] = [
        ShipmentStatus::Booked,
        ShipmentStatus::PickedUp,
        ShipmentStatus::InTransit,
        ShipmentStatus::CustomsClearance,
        ShipmentStatus::OnHold,
        ShipmentStatus::OutForDelivery,
        ShipmentStatus::Delivered,
    ];

    /// Once-only lifecycle milestones.
    pub fn is_milestone(&self) -> bool {
        matches!(
            self,
            ShipmentStatus::Booked | ShipmentStatus::PickedUp | ShipmentStatus::Delivered
        )
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered)
    }

    /// Wire label (matches the serde representation).
    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::Booked => "Booked",
            ShipmentStatus::PickedUp => "Picked Up",
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::CustomsClearance => "Customs Clearance",
            ShipmentStatus::OnHold => "On Hold",
            ShipmentStatus::OutForDelivery => "Out for Delivery",
            ShipmentStatus::Delivered => "Delivered",
        }
    }
}

impl core::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShipmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ShipmentStatus::ALL
            .into_iter()
            .find(|status| status.label().to_lowercase() == needle)
            .ok_or_else(|| DomainError::invalid_status(format!("unrecognized status: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_are_exactly_booked_pickup_delivered() {
        let milestones: Vec<_> = ShipmentStatus::ALL
            .into_iter()
            .filter(ShipmentStatus::is_milestone)
            .collect();
        assert_eq!(
            milestones,
            vec![
                ShipmentStatus::Booked,
                ShipmentStatus::PickedUp,
                ShipmentStatus::Delivered
            ]
        );
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for status in ShipmentStatus::ALL {
            assert_eq!(status.label().parse::<ShipmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(
            "out for delivery".parse::<ShipmentStatus>().unwrap(),
            ShipmentStatus::OutForDelivery
        );
    }

    #[test]
    fn unknown_status_yields_invalid_status() {
        let err = "Teleported".parse::<ShipmentStatus>().unwrap_err();
        assert!(matches!(err, dovic_core::DomainError::InvalidStatus(_)));
    }

    #[test]
    fn serde_uses_wire_labels() {
        let json = serde_json::to_string(&ShipmentStatus::PickedUp).unwrap();
        assert_eq!(json, "\"Picked Up\"");
        let back: ShipmentStatus = serde_json::from_str("\"Out for Delivery\"").unwrap();
        assert_eq!(back, ShipmentStatus::OutForDelivery);
    }
}
