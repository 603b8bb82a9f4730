use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dovic_core::{DomainError, DomainResult, ShipmentId, TrackingCode, TrackingEventId};
use dovic_shipments::ShipmentStatus;

/// Geographic coordinates attached to a tracking event.
///
/// Best-effort enrichment: absent whenever geocoding failed or has not run
/// yet. Map-ready (Leaflet / Google Maps take these verbatim).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One immutable row in the tracking ledger.
///
/// Never mutated after insertion, with a single exception: coordinates may be
/// enriched once from `None` to `Some` after the owning transaction commits.
/// Rows are deleted only as a cascade of their shipment's deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    id: TrackingEventId,
    shipment: ShipmentId,
    /// Denormalized so public tracking lookups need no join.
    tracking_code: TrackingCode,
    status: ShipmentStatus,
    city: String,
    country: String,
    coordinates: Option<Coordinates>,
    message: String,
    recorded_at: DateTime<Utc>,
}

impl TrackingEvent {
    /// Build a new ledger row. Requires a non-empty location; an empty
    /// message defaults to "<status> at <city>, <country>".
    pub fn record(
        shipment: ShipmentId,
        tracking_code: TrackingCode,
        status: ShipmentStatus,
        city: impl Into<String>,
        country: impl Into<String>,
        message: Option<String>,
        coordinates: Option<Coordinates>,
        recorded_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let city = city.into();
        let country = country.into();
        if city.trim().is_empty() {
            return Err(DomainError::validation("city is required"));
        }
        if country.trim().is_empty() {
            return Err(DomainError::validation("country is required"));
        }

        let message = match message {
            Some(m) if !m.trim().is_empty() => m,
            _ => format!("{status} at {city}, {country}"),
        };

        Ok(Self {
            id: TrackingEventId::new(),
            shipment,
            tracking_code,
            status,
            city,
            country,
            coordinates,
            message,
            recorded_at,
        })
    }

    pub fn id(&self) -> TrackingEventId {
        self.id
    }

    pub fn shipment(&self) -> ShipmentId {
        self.shipment
    }

    pub fn tracking_code(&self) -> &TrackingCode {
        &self.tracking_code
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// "City, Country" display form used by tracking pages.
    pub fn location(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }

    /// One-shot coordinate enrichment (None -> Some only).
    pub fn enrich_coordinates(&mut self, coordinates: Coordinates) -> DomainResult<()> {
        if self.coordinates.is_some() {
            return Err(DomainError::conflict(format!(
                "tracking event {} already has coordinates",
                self.id
            )));
        }
        self.coordinates = Some(coordinates);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(message: Option<String>) -> TrackingEvent {
        TrackingEvent::record(
            ShipmentId::new(),
            TrackingCode::generate(Utc::now()),
            ShipmentStatus::InTransit,
            "Accra",
            "Ghana",
            message,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_message_defaults_to_status_and_location() {
        let e = event(None);
        assert_eq!(e.message(), "In Transit at Accra, Ghana");
        let e = event(Some("  ".to_string()));
        assert_eq!(e.message(), "In Transit at Accra, Ghana");
    }

    #[test]
    fn explicit_message_is_kept() {
        let e = event(Some("Held at customs desk 4".to_string()));
        assert_eq!(e.message(), "Held at customs desk 4");
    }

    #[test]
    fn location_is_required() {
        let result = TrackingEvent::record(
            ShipmentId::new(),
            TrackingCode::generate(Utc::now()),
            ShipmentStatus::OnHold,
            "",
            "Ghana",
            None,
            None,
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn coordinates_enrich_only_once() {
        let mut e = event(None);
        assert_eq!(e.coordinates(), None);
        e.enrich_coordinates(Coordinates { lat: 5.55, lng: -0.2 }).unwrap();
        assert!(e
            .enrich_coordinates(Coordinates { lat: 0.0, lng: 0.0 })
            .is_err());
        assert_eq!(
            e.coordinates(),
            Some(Coordinates { lat: 5.55, lng: -0.2 })
        );
    }
}
