use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use dovic_core::{CustomerId, QuoteId, ShipmentId, TrackingCode, TrackingEventId};
use dovic_quotes::Quote;
use dovic_shipments::{Shipment, ShipmentStatus};
use dovic_tracking::{Coordinates, TrackingEvent};

use super::{FreightStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    quotes: HashMap<QuoteId, Quote>,
    shipments: HashMap<ShipmentId, Shipment>,
    codes: HashMap<String, ShipmentId>,
    invoice_numbers: HashSet<String>,
    events: HashMap<ShipmentId, Vec<TrackingEvent>>,
    milestones: HashSet<(ShipmentId, ShipmentStatus)>,
}

/// In-memory freight store.
///
/// Backs tests and zero-config deployments. A single write lock over every
/// multi-record operation gives the same atomicity the Postgres store gets
/// from transactions; check+insert for milestones and the delivered latch
/// happen under that one lock, so no interleaving can slip a duplicate in.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

impl Inner {
    /// Milestone + latch checks and the status mirror, under the caller's
    /// write lock. Shared by every event-inserting operation.
    fn insert_event(&mut self, event: &TrackingEvent) -> Result<Shipment, StoreError> {
        let shipment_id = event.shipment();
        let shipment = self
            .shipments
            .get_mut(&shipment_id)
            .ok_or(StoreError::NotFound)?;

        if shipment.is_delivered() {
            return Err(StoreError::DeliveredLock);
        }
        let status = event.status();
        if status.is_milestone() && self.milestones.contains(&(shipment_id, status)) {
            return Err(StoreError::DuplicateMilestone(status));
        }

        shipment
            .record_status(status, event.recorded_at())
            .map_err(|e| StoreError::Conflict(e.to_string()))?;

        if status.is_milestone() {
            self.milestones.insert((shipment_id, status));
        }
        self.events.entry(shipment_id).or_default().push(event.clone());
        Ok(shipment.clone())
    }

    fn reserve_codes(&mut self, shipment: &Shipment) -> Result<(), StoreError> {
        let code = shipment.tracking_code().as_str();
        let number = shipment.invoice().number.as_str();
        if self.codes.contains_key(code) || self.invoice_numbers.contains(number) {
            return Err(StoreError::DuplicateTrackingCode);
        }
        self.codes.insert(code.to_string(), shipment.id());
        self.invoice_numbers.insert(number.to_string());
        Ok(())
    }
}

fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

#[async_trait]
impl FreightStore for InMemoryStore {
    async fn insert_quote(&self, quote: &Quote) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.quotes.insert(quote.id(), quote.clone());
        Ok(())
    }

    async fn update_quote(&self, quote: &Quote) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        if !inner.quotes.contains_key(&quote.id()) {
            return Err(StoreError::NotFound);
        }
        inner.quotes.insert(quote.id(), quote.clone());
        Ok(())
    }

    async fn get_quote(&self, id: QuoteId) -> Result<Quote, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        inner.quotes.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_quotes(&self) -> Result<Vec<Quote>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(newest_first(
            inner.quotes.values().cloned().collect(),
            Quote::created_at,
        ))
    }

    async fn list_quotes_for_customer(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<Quote>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(newest_first(
            inner
                .quotes
                .values()
                .filter(|q| q.customer_id() == Some(customer))
                .cloned()
                .collect(),
            Quote::created_at,
        ))
    }

    async fn create_shipment(
        &self,
        shipment: &Shipment,
        first_event: &TrackingEvent,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.reserve_codes(shipment)?;
        inner.shipments.insert(shipment.id(), shipment.clone());
        inner.insert_event(first_event)?;
        Ok(())
    }

    async fn convert_quote(
        &self,
        quote: &Quote,
        shipment: &Shipment,
        first_event: &TrackingEvent,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        // The stored quote arbitrates: a caller holding a pre-conversion read
        // must not overwrite a quote another conversion already linked.
        let stored = inner.quotes.get(&quote.id()).ok_or(StoreError::NotFound)?;
        if stored.shipment().is_some() {
            return Err(StoreError::QuoteAlreadyConverted);
        }
        inner.reserve_codes(shipment)?;
        inner.quotes.insert(quote.id(), quote.clone());
        inner.shipments.insert(shipment.id(), shipment.clone());
        inner.insert_event(first_event)?;
        Ok(())
    }

    async fn get_shipment(&self, id: ShipmentId) -> Result<Shipment, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        inner.shipments.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_shipment_by_code(&self, code: &TrackingCode) -> Result<Shipment, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let id = inner.codes.get(code.as_str()).ok_or(StoreError::NotFound)?;
        inner.shipments.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(newest_first(
            inner.shipments.values().cloned().collect(),
            Shipment::created_at,
        ))
    }

    async fn delete_shipment(&self, id: ShipmentId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let shipment = inner.shipments.remove(&id).ok_or(StoreError::NotFound)?;
        inner.codes.remove(shipment.tracking_code().as_str());
        inner
            .invoice_numbers
            .remove(shipment.invoice().number.as_str());
        inner.events.remove(&id);
        inner.milestones.retain(|(ship, _)| *ship != id);
        Ok(())
    }

    async fn append_event(&self, event: &TrackingEvent) -> Result<Shipment, StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.insert_event(event)
    }

    async fn list_events(&self, shipment: ShipmentId) -> Result<Vec<TrackingEvent>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut events = inner.events.get(&shipment).cloned().unwrap_or_default();
        // Stable sort keeps insertion order between equal timestamps.
        events.sort_by_key(TrackingEvent::recorded_at);
        Ok(events)
    }

    async fn set_event_coordinates(
        &self,
        id: TrackingEventId,
        coordinates: Coordinates,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let event = inner
            .events
            .values_mut()
            .flatten()
            .find(|e| e.id() == id)
            .ok_or(StoreError::NotFound)?;
        event
            .enrich_coordinates(coordinates)
            .map_err(|e| StoreError::Conflict(e.to_string()))
    }
}
