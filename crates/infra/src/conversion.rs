//! Quote-to-shipment conversion orchestrator.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use dovic_core::{DomainError, DomainResult, InvoiceNumber, QuoteId, TrackingCode};
use dovic_notify::{Geocoder, Mailer, OutboundEmail};
use dovic_quotes::{Quote, QuoteStatus, ShipmentDetails};
use dovic_shipments::{NewShipment, Shipment, ShipmentStatus};
use dovic_tracking::TrackingEvent;

use crate::enrich::{spawn_coordinate_enrichment, spawn_email};
use crate::registry::MAX_CODE_ATTEMPTS;
use crate::store::{FreightStore, StoreError};

/// Precondition for converting a quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversionPolicy {
    /// The customer must have submitted shipment details (quote in
    /// `ReadyForShipment`). Repository default.
    #[default]
    RequireShipmentDetails,
    /// `Accepted` suffices; the operator supplies any missing details in the
    /// convert request itself.
    AcceptedSuffices,
}

/// Turns a finalized quote into a booked shipment.
///
/// The whole effect (converted quote, new shipment with invoice, first
/// `Booked` event) is one store unit of work; a code collision retries with
/// fresh codes, bounded. Geocoding and the booking email run after commit.
pub struct ConversionOrchestrator {
    store: Arc<dyn FreightStore>,
    geocoder: Arc<dyn Geocoder>,
    mailer: Arc<dyn Mailer>,
    policy: ConversionPolicy,
}

impl ConversionOrchestrator {
    pub fn new(
        store: Arc<dyn FreightStore>,
        geocoder: Arc<dyn Geocoder>,
        mailer: Arc<dyn Mailer>,
        policy: ConversionPolicy,
    ) -> Self {
        Self {
            store,
            geocoder,
            mailer,
            policy,
        }
    }

    /// Convert the quote. Submitted details win over details provided in the
    /// request; a complete details block must come from one of the two.
    pub async fn convert(
        &self,
        quote_id: QuoteId,
        provided_details: Option<ShipmentDetails>,
        now: DateTime<Utc>,
    ) -> DomainResult<(Quote, Shipment)> {
        let quote = self.store.get_quote(quote_id).await?;

        if self.policy == ConversionPolicy::RequireShipmentDetails
            && quote.status() != QuoteStatus::ReadyForShipment
        {
            return Err(DomainError::invalid_transition(
                quote.status().as_str(),
                "convert",
            ));
        }

        let details = quote
            .shipment_details()
            .cloned()
            .or(provided_details)
            .ok_or_else(|| {
                DomainError::validation("shipment details are required for conversion")
            })?;
        details.validate()?;

        let price = quote
            .price()
            .ok_or_else(|| DomainError::validation("quote has no agreed price"))?;

        let spec = NewShipment {
            customer: quote.customer_id(),
            quote: Some(quote.id()),
            sender: details.sender.clone(),
            receiver: details.receiver.clone(),
            origin: quote.pickup().to_string(),
            destination: quote.destination().to_string(),
            city: details.city.clone(),
            country: details.country.clone(),
            weight_kg: quote.weight_kg(),
            quantity: details.quantity,
            delivery_range: quote.delivery_range().unwrap_or_default(),
            price,
            discount: 0.0,
            public_invoice: false,
        };

        for _ in 0..MAX_CODE_ATTEMPTS {
            let shipment = Shipment::book(
                spec.clone(),
                TrackingCode::generate(now),
                InvoiceNumber::generate(now),
                now,
            )?;
            let mut converted = quote.clone();
            converted.mark_converted(shipment.id(), now)?;

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

            match self
                .store
                .convert_quote(&converted, &shipment, &first_event)
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        quote_id = %quote_id,
                        shipment_id = %shipment.id(),
                        tracking_code = %shipment.tracking_code(),
                        "quote converted to shipment"
                    );
                    self.after_conversion(&converted, &shipment, &first_event);
                    return Ok((converted, shipment));
                }
                Err(StoreError::DuplicateTrackingCode) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(DomainError::conflict(
            "could not allocate a unique tracking code",
        ))
    }

    fn after_conversion(&self, quote: &Quote, shipment: &Shipment, first_event: &TrackingEvent) {
        spawn_coordinate_enrichment(self.store.clone(), self.geocoder.clone(), first_event);

        let recipient = quote
            .requester()
            .email()
            .map(str::to_string)
            .or_else(|| shipment.sender().email.clone());
        if let Some(email) = recipient {
            spawn_email(
                self.mailer.clone(),
                OutboundEmail::shipment_booked(email, shipment.tracking_code().as_str()),
            );
        }
    }
}
