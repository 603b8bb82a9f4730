//! Shipment registry service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use dovic_core::{DomainError, DomainResult, InvoiceNumber, ShipmentId, TrackingCode};
use dovic_notify::{Geocoder, Mailer, OutboundEmail};
use dovic_quotes::QuoteStatus;
use dovic_shipments::{NewShipment, Shipment, ShipmentStatus};
use dovic_tracking::TrackingEvent;

use crate::enrich::{spawn_coordinate_enrichment, spawn_email};
use crate::store::{FreightStore, StoreError};

/// Bounded retries on the (rare) tracking-code or invoice-number collision.
pub(crate) const MAX_CODE_ATTEMPTS: usize = 5;

/// Dashboard counters plus the most recent shipments.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub total_shipments: usize,
    pub in_transit: usize,
    pub delivered: usize,
    pub total_quotes: usize,
    pub pending_quotes: usize,
    pub recent_shipments: Vec<Shipment>,
}

/// Registry of record for shipments.
///
/// Owns booking (fresh codes, invoice, first `Booked` event), the two
/// system-controlled status paths, deletion and the admin reads. Milestone
/// uniqueness and the delivered latch are resolved by the store inside each
/// unit of work; this service never pre-checks them.
pub struct ShipmentRegistry {
    store: Arc<dyn FreightStore>,
    geocoder: Arc<dyn Geocoder>,
    mailer: Arc<dyn Mailer>,
}

impl ShipmentRegistry {
    pub fn new(
        store: Arc<dyn FreightStore>,
        geocoder: Arc<dyn Geocoder>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            geocoder,
            mailer,
        }
    }

    /// Book a walk-in shipment: invoice, fresh tracking code (retried on
    /// collision), shipment plus its first `Booked` event in one unit of
    /// work, then post-commit geocoding and the booking email.
    pub async fn create(&self, spec: NewShipment, now: DateTime<Utc>) -> DomainResult<Shipment> {
        spec.validate()?;

        for _ in 0..MAX_CODE_ATTEMPTS {
            let shipment = Shipment::book(
                spec.clone(),
                TrackingCode::generate(now),
                InvoiceNumber::generate(now),
                now,
            )?;
            let first_event = TrackingEvent::record(
                shipment.id(),
                shipment.tracking_code().clone(),
                ShipmentStatus::Booked,
                shipment.city(),
                shipment.country(),
                Some("Shipment booked".to_string()),
                None,
                now,
            )?;

            match self.store.create_shipment(&shipment, &first_event).await {
                Ok(()) => {
                    tracing::info!(
                        shipment_id = %shipment.id(),
                        tracking_code = %shipment.tracking_code(),
                        "shipment booked"
                    );
                    self.after_booking(&shipment, &first_event);
                    return Ok(shipment);
                }
                Err(StoreError::DuplicateTrackingCode) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(DomainError::conflict(
            "could not allocate a unique tracking code",
        ))
    }

    /// Generic status update. `Booked` and `Picked Up` are system-controlled
    /// (set by booking and by [`Self::confirm_pickup`]) and are rejected
    /// here; `Delivered` is the delivery transition and latches the record.
    pub async fn update_status(
        &self,
        id: ShipmentId,
        status: ShipmentStatus,
        city: Option<String>,
        country: Option<String>,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Shipment> {
        if matches!(status, ShipmentStatus::Booked | ShipmentStatus::PickedUp) {
            return Err(DomainError::invalid_status(format!(
                "status \"{status}\" is system-controlled and cannot be set through a status update"
            )));
        }
        self.append_for(id, status, city, country, message, now).await
    }

    /// Once-only pickup confirmation. A second confirmation fails
    /// `SystemStatusConflict` out of the store's milestone rule.
    pub async fn confirm_pickup(
        &self,
        id: ShipmentId,
        city: Option<String>,
        country: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Shipment> {
        self.append_for(
            id,
            ShipmentStatus::PickedUp,
            city,
            country,
            Some("Package picked up".to_string()),
            now,
        )
        .await
    }

    async fn append_for(
        &self,
        id: ShipmentId,
        status: ShipmentStatus,
        city: Option<String>,
        country: Option<String>,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Shipment> {
        let shipment = self.store.get_shipment(id).await?;
        let event = TrackingEvent::record(
            shipment.id(),
            shipment.tracking_code().clone(),
            status,
            city.unwrap_or_else(|| shipment.city().to_string()),
            country.unwrap_or_else(|| shipment.country().to_string()),
            message,
            None,
            now,
        )?;

        let updated = self.store.append_event(&event).await?;
        tracing::info!(
            shipment_id = %id,
            status = %status,
            "shipment status updated"
        );

        spawn_coordinate_enrichment(self.store.clone(), self.geocoder.clone(), &event);
        if let Some(email) = updated.sender().email.as_deref() {
            spawn_email(
                self.mailer.clone(),
                OutboundEmail::status_updated(email, updated.tracking_code().as_str(), status.label()),
            );
        }
        Ok(updated)
    }

    /// Delete the shipment and its entire ledger. Irreversible.
    pub async fn delete(&self, id: ShipmentId) -> DomainResult<()> {
        self.store.delete_shipment(id).await?;
        tracing::info!(shipment_id = %id, "shipment deleted with its tracking history");
        Ok(())
    }

    pub async fn get(&self, id: ShipmentId) -> DomainResult<Shipment> {
        Ok(self.store.get_shipment(id).await?)
    }

    pub async fn get_by_code(&self, code: &TrackingCode) -> DomainResult<Shipment> {
        Ok(self.store.get_shipment_by_code(code).await?)
    }

    pub async fn list(&self) -> DomainResult<Vec<Shipment>> {
        Ok(self.store.list_shipments().await?)
    }

    /// Dashboard read: counters plus the five most recent shipments.
    pub async fn stats(&self) -> DomainResult<RegistryStats> {
        let shipments = self.store.list_shipments().await?;
        let quotes = self.store.list_quotes().await?;

        let delivered = shipments.iter().filter(|s| s.is_delivered()).count();
        let in_transit = shipments
            .iter()
            .filter(|s| s.status() == ShipmentStatus::InTransit)
            .count();
        let pending_quotes = quotes
            .iter()
            .filter(|q| q.status() == QuoteStatus::Pending)
            .count();

        Ok(RegistryStats {
            total_shipments: shipments.len(),
            in_transit,
            delivered,
            total_quotes: quotes.len(),
            pending_quotes,
            recent_shipments: shipments.into_iter().take(5).collect(),
        })
    }

    pub(crate) fn after_booking(&self, shipment: &Shipment, first_event: &TrackingEvent) {
        spawn_coordinate_enrichment(self.store.clone(), self.geocoder.clone(), first_event);
        if let Some(email) = shipment.sender().email.as_deref() {
            spawn_email(
                self.mailer.clone(),
                OutboundEmail::shipment_booked(email, shipment.tracking_code().as_str()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dovic_core::{ContactInfo, DeliveryRange};
    use dovic_notify::{LogMailer, NullGeocoder};

    use crate::store::InMemoryStore;

    fn registry() -> (ShipmentRegistry, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let registry = ShipmentRegistry::new(
            store.clone(),
            Arc::new(NullGeocoder),
            Arc::new(LogMailer),
        );
        (registry, store)
    }

    fn contact(name: &str) -> ContactInfo {
        ContactInfo {
            name: name.to_string(),
            phone: "+2348012345678".to_string(),
            address: "12 Marina Rd".to_string(),
            email: None,
        }
    }

    fn spec() -> NewShipment {
        NewShipment {
            customer: None,
            quote: None,
            sender: contact("Ada Obi"),
            receiver: contact("John Hart"),
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
        }
    }

    #[tokio::test]
    async fn booking_writes_shipment_and_first_event() {
        let (registry, store) = registry();
        let shipment = registry.create(spec(), Utc::now()).await.unwrap();

        assert_eq!(shipment.status(), ShipmentStatus::Booked);
        let events = store.list_events(shipment.id()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status(), ShipmentStatus::Booked);
        assert_eq!(events[0].message(), "Shipment booked");
    }

    #[tokio::test]
    async fn generic_update_rejects_system_controlled_statuses() {
        let (registry, _) = registry();
        let shipment = registry.create(spec(), Utc::now()).await.unwrap();

        for status in [ShipmentStatus::Booked, ShipmentStatus::PickedUp] {
            let err = registry
                .update_status(shipment.id(), status, None, None, None, Utc::now())
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidStatus(_)), "{status}");
        }
    }

    #[tokio::test]
    async fn generic_update_delivers_and_latches() {
        let (registry, _) = registry();
        let shipment = registry.create(spec(), Utc::now()).await.unwrap();

        let updated = registry
            .update_status(
                shipment.id(),
                ShipmentStatus::Delivered,
                Some("London".to_string()),
                Some("United Kingdom".to_string()),
                None,
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(updated.is_delivered());

        let err = registry
            .update_status(
                shipment.id(),
                ShipmentStatus::InTransit,
                None,
                None,
                None,
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Locked(_)));
    }

    #[tokio::test]
    async fn pickup_confirmation_is_once_only() {
        let (registry, _) = registry();
        let shipment = registry.create(spec(), Utc::now()).await.unwrap();

        let updated = registry
            .confirm_pickup(shipment.id(), None, None, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.status(), ShipmentStatus::PickedUp);

        let err = registry
            .confirm_pickup(shipment.id(), None, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SystemStatusConflict(_)));
    }

    #[tokio::test]
    async fn delete_removes_shipment_and_ledger() {
        let (registry, store) = registry();
        let shipment = registry.create(spec(), Utc::now()).await.unwrap();

        registry.delete(shipment.id()).await.unwrap();
        assert!(matches!(
            registry.get(shipment.id()).await.unwrap_err(),
            DomainError::NotFound
        ));
        assert!(store.list_events(shipment.id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_count_statuses_and_cap_recents() {
        let (registry, _) = registry();
        for _ in 0..6 {
            registry.create(spec(), Utc::now()).await.unwrap();
        }
        let one = registry.create(spec(), Utc::now()).await.unwrap();
        registry
            .update_status(
                one.id(),
                ShipmentStatus::Delivered,
                None,
                None,
                None,
                Utc::now(),
            )
            .await
            .unwrap();

        let stats = registry.stats().await.unwrap();
        assert_eq!(stats.total_shipments, 7);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.recent_shipments.len(), 5);
    }
}
