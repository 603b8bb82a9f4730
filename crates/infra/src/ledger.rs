//! Tracking ledger service.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use dovic_core::{DomainError, DomainResult, ShipmentId, TrackingCode};
use dovic_notify::Geocoder;
use dovic_shipments::{Shipment, ShipmentStatus};
use dovic_tracking::{Coordinates, TrackingEvent};

use crate::enrich::spawn_coordinate_enrichment;
use crate::store::FreightStore;

/// Read and manual-append surface over the tracking ledger.
///
/// The public tracking page polls [`Self::track`]; operators append
/// progress notes through [`Self::append_manual`]. Milestone statuses never
/// pass through the manual path at all: booking, pickup confirmation and the
/// delivery transition own them.
pub struct TrackingLedger {
    store: Arc<dyn FreightStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl TrackingLedger {
    pub fn new(store: Arc<dyn FreightStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    /// Public tracking read: the shipment summary plus its full history,
    /// oldest first.
    pub async fn track(
        &self,
        code: &TrackingCode,
    ) -> DomainResult<(Shipment, Vec<TrackingEvent>)> {
        let shipment = self.store.get_shipment_by_code(code).await?;
        let events = self.store.list_events(shipment.id()).await?;
        Ok((shipment, events))
    }

    pub async fn list_for_shipment(
        &self,
        shipment: ShipmentId,
    ) -> DomainResult<Vec<TrackingEvent>> {
        Ok(self.store.list_events(shipment).await?)
    }

    /// Operator append keyed by tracking code.
    ///
    /// Rejects all three milestone statuses; the append and the status mirror
    /// commit as one store unit of work, and coordinates are enriched
    /// afterwards when the caller did not supply them.
    pub async fn append_manual(
        &self,
        code: &TrackingCode,
        status: ShipmentStatus,
        city: impl Into<String>,
        country: impl Into<String>,
        message: Option<String>,
        coordinates: Option<Coordinates>,
        now: DateTime<Utc>,
    ) -> DomainResult<TrackingEvent> {
        if status.is_milestone() {
            return Err(DomainError::invalid_status(format!(
                "status \"{status}\" is system-controlled and cannot be appended manually"
            )));
        }

        let shipment = self.store.get_shipment_by_code(code).await?;
        let event = TrackingEvent::record(
            shipment.id(),
            code.clone(),
            status,
            city,
            country,
            message,
            coordinates,
            now,
        )?;
        self.store.append_event(&event).await?;
        tracing::info!(tracking_code = %code, status = %status, "tracking event appended");

        spawn_coordinate_enrichment(self.store.clone(), self.geocoder.clone(), &event);
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dovic_core::{ContactInfo, DeliveryRange, InvoiceNumber};
    use dovic_notify::NullGeocoder;
    use dovic_shipments::NewShipment;

    use crate::store::InMemoryStore;

    async fn seeded() -> (TrackingLedger, Shipment) {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let shipment = Shipment::book(
            NewShipment {
                customer: None,
                quote: None,
                sender: ContactInfo {
                    name: "Ada Obi".to_string(),
                    phone: "+2348012345678".to_string(),
                    address: "12 Marina Rd".to_string(),
                    email: None,
                },
                receiver: ContactInfo {
                    name: "John Hart".to_string(),
                    phone: "+447700900000".to_string(),
                    address: "1 King's Rd".to_string(),
                    email: None,
                },
                origin: "Lagos".to_string(),
                destination: "London".to_string(),
                city: "Lagos".to_string(),
                country: "Nigeria".to_string(),
                weight_kg: 5.0,
                quantity: 1,
                delivery_range: DeliveryRange::Standard,
                price: 120.0,
                discount: 0.0,
                public_invoice: false,
            },
            TrackingCode::generate(now),
            InvoiceNumber::generate(now),
            now,
        )
        .unwrap();
        let first = TrackingEvent::record(
            shipment.id(),
            shipment.tracking_code().clone(),
            ShipmentStatus::Booked,
            "Lagos",
            "Nigeria",
            None,
            None,
            now,
        )
        .unwrap();
        store.create_shipment(&shipment, &first).await.unwrap();

        (
            TrackingLedger::new(store, Arc::new(NullGeocoder)),
            shipment,
        )
    }

    #[tokio::test]
    async fn track_returns_summary_and_ordered_history() {
        let (ledger, shipment) = seeded().await;
        ledger
            .append_manual(
                shipment.tracking_code(),
                ShipmentStatus::InTransit,
                "Accra",
                "Ghana",
                None,
                None,
                Utc::now(),
            )
            .await
            .unwrap();

        let (summary, events) = ledger.track(shipment.tracking_code()).await.unwrap();
        assert_eq!(summary.status(), ShipmentStatus::InTransit);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status(), ShipmentStatus::Booked);
        assert_eq!(events[1].status(), ShipmentStatus::InTransit);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let (ledger, _) = seeded().await;
        let code = TrackingCode::generate(Utc::now());
        assert!(matches!(
            ledger.track(&code).await.unwrap_err(),
            DomainError::NotFound
        ));
    }

    #[tokio::test]
    async fn manual_append_rejects_every_milestone() {
        let (ledger, shipment) = seeded().await;
        for status in [
            ShipmentStatus::Booked,
            ShipmentStatus::PickedUp,
            ShipmentStatus::Delivered,
        ] {
            let err = ledger
                .append_manual(
                    shipment.tracking_code(),
                    status,
                    "Accra",
                    "Ghana",
                    None,
                    None,
                    Utc::now(),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidStatus(_)), "{status}");
        }
    }

    #[tokio::test]
    async fn manual_append_keeps_caller_coordinates() {
        let (ledger, shipment) = seeded().await;
        let coords = Coordinates { lat: 5.55, lng: -0.2 };
        let event = ledger
            .append_manual(
                shipment.tracking_code(),
                ShipmentStatus::CustomsClearance,
                "Accra",
                "Ghana",
                Some("Customs desk 4".to_string()),
                Some(coords),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(event.coordinates(), Some(coords));
        assert_eq!(event.message(), "Customs desk 4");
    }
}
