use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dovic_core::{
    ContactInfo, CustomerId, DeliveryRange, DomainError, DomainResult, InvoiceNumber, QuoteId,
    ShipmentId, TrackingCode,
};

use crate::invoice::Invoice;
use crate::status::ShipmentStatus;

/// Validated specification for booking a new shipment.
///
/// Built either by the conversion orchestrator (from a finalized quote) or by
/// an operator creating a walk-in shipment directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShipment {
    pub customer: Option<CustomerId>,
    pub quote: Option<QuoteId>,
    pub sender: ContactInfo,
    pub receiver: ContactInfo,
    pub origin: String,
    pub destination: String,
    pub city: String,
    pub country: String,
    pub weight_kg: f64,
    pub quantity: u32,
    pub delivery_range: DeliveryRange,
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    /// When true the invoice sub-record may be read unauthenticated.
    #[serde(default)]
    pub public_invoice: bool,
}

impl NewShipment {
    pub fn validate(&self) -> DomainResult<()> {
        self.sender.validate("sender")?;
        self.receiver.validate("receiver")?;
        if self.origin.trim().is_empty() {
            return Err(DomainError::validation("origin is required"));
        }
        if self.destination.trim().is_empty() {
            return Err(DomainError::validation("destination is required"));
        }
        if self.city.trim().is_empty() {
            return Err(DomainError::validation("city is required"));
        }
        if self.country.trim().is_empty() {
            return Err(DomainError::validation("country is required"));
        }
        if !(self.weight_kg > 0.0) {
            return Err(DomainError::validation("weight must be greater than zero"));
        }
        if self.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        if !(self.price >= 0.0) {
            return Err(DomainError::validation("price must not be negative"));
        }
        Ok(())
    }
}

/// The registered, trackable physical consignment.
///
/// Created exclusively through [`Shipment::book`]; the current status mirrors
/// the latest tracking-ledger event. Once `delivered` latches true the record
/// is frozen against further status mutation through every path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    id: ShipmentId,
    tracking_code: TrackingCode,
    customer: Option<CustomerId>,
    quote: Option<QuoteId>,
    sender: ContactInfo,
    receiver: ContactInfo,
    origin: String,
    destination: String,
    city: String,
    country: String,
    weight_kg: f64,
    quantity: u32,
    delivery_range: DeliveryRange,
    estimated_delivery: DateTime<Utc>,
    price: f64,
    invoice: Invoice,
    public_invoice: bool,
    status: ShipmentStatus,
    delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Shipment {
    /// Book a shipment: validate the spec, compute the invoice from the
    /// country tax table, derive the estimated delivery date from the
    /// delivery-range policy, and start the lifecycle at `Booked`.
    pub fn book(
        spec: NewShipment,
        tracking_code: TrackingCode,
        invoice_number: InvoiceNumber,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        spec.validate()?;

        let invoice = Invoice::compute(invoice_number, spec.price, &spec.country, spec.discount)?;
        let estimated_delivery = spec.delivery_range.estimated_delivery(now);

        Ok(Self {
            id: ShipmentId::new(),
            tracking_code,
            customer: spec.customer,
            quote: spec.quote,
            sender: spec.sender,
            receiver: spec.receiver,
            origin: spec.origin,
            destination: spec.destination,
            city: spec.city,
            country: spec.country,
            weight_kg: spec.weight_kg,
            quantity: spec.quantity,
            delivery_range: spec.delivery_range,
            estimated_delivery,
            price: spec.price,
            invoice,
            public_invoice: spec.public_invoice,
            status: ShipmentStatus::Booked,
            delivered: false,
            delivered_at: None,
            created_at: now,
        })
    }

    pub fn id(&self) -> ShipmentId {
        self.id
    }

    pub fn tracking_code(&self) -> &TrackingCode {
        &self.tracking_code
    }

    pub fn customer(&self) -> Option<CustomerId> {
        self.customer
    }

    pub fn quote(&self) -> Option<QuoteId> {
        self.quote
    }

    pub fn sender(&self) -> &ContactInfo {
        &self.sender
    }

    pub fn receiver(&self) -> &ContactInfo {
        &self.receiver
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn delivery_range(&self) -> DeliveryRange {
        self.delivery_range
    }

    pub fn estimated_delivery(&self) -> DateTime<Utc> {
        self.estimated_delivery
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn public_invoice(&self) -> bool {
        self.public_invoice
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Mirror a tracking status onto the record.
    ///
    /// Rejects every mutation once the delivered latch is set. When the new
    /// status is the delivery status, latches `delivered` and stamps
    /// `delivered_at` in the same mutation.
    pub fn record_status(&mut self, status: ShipmentStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if self.delivered {
            return Err(DomainError::locked(format!(
                "shipment {} has already been delivered; further status updates are not allowed",
                self.tracking_code
            )));
        }

        self.status = status;
        if status.is_delivery() {
            self.delivered = true;
            self.delivered_at = Some(now);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

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

    fn book(spec: NewShipment) -> Shipment {
        let now = Utc::now();
        Shipment::book(
            spec,
            TrackingCode::generate(now),
            InvoiceNumber::generate(now),
            now,
        )
        .unwrap()
    }

    #[test]
    fn booking_starts_at_booked_with_latch_open() {
        let s = book(spec());
        assert_eq!(s.status(), ShipmentStatus::Booked);
        assert!(!s.is_delivered());
        assert_eq!(s.delivered_at(), None);
    }

    #[test]
    fn booking_computes_invoice_from_country_table() {
        let s = book(spec());
        assert_eq!(s.invoice().subtotal, 120.0);
        assert_eq!(s.invoice().tax_rate_percent, 7.5);
        assert_eq!(s.invoice().tax, 9.0);
        assert_eq!(s.invoice().total, 129.0);
    }

    #[test]
    fn booking_derives_estimated_delivery_from_range_policy() {
        let now = Utc::now();
        let s = Shipment::book(
            NewShipment {
                delivery_range: DeliveryRange::Express,
                ..spec()
            },
            TrackingCode::generate(now),
            InvoiceNumber::generate(now),
            now,
        )
        .unwrap();
        assert_eq!(s.estimated_delivery(), now + Duration::days(2));
    }

    #[test]
    fn booking_rejects_incomplete_specs() {
        let mut bad = spec();
        bad.weight_kg = 0.0;
        assert!(Shipment::book(
            bad,
            TrackingCode::generate(Utc::now()),
            InvoiceNumber::generate(Utc::now()),
            Utc::now()
        )
        .is_err());

        let mut bad = spec();
        bad.receiver.address = String::new();
        assert!(Shipment::book(
            bad,
            TrackingCode::generate(Utc::now()),
            InvoiceNumber::generate(Utc::now()),
            Utc::now()
        )
        .is_err());

        let mut bad = spec();
        bad.price = -1.0;
        assert!(Shipment::book(
            bad,
            TrackingCode::generate(Utc::now()),
            InvoiceNumber::generate(Utc::now()),
            Utc::now()
        )
        .is_err());
    }

    #[test]
    fn status_mirror_updates_current_status() {
        let mut s = book(spec());
        s.record_status(ShipmentStatus::InTransit, Utc::now()).unwrap();
        assert_eq!(s.status(), ShipmentStatus::InTransit);
        assert!(!s.is_delivered());
    }

    #[test]
    fn delivery_latches_and_freezes_the_record() {
        let mut s = book(spec());
        let delivered_at = Utc::now();
        s.record_status(ShipmentStatus::Delivered, delivered_at).unwrap();
        assert!(s.is_delivered());
        assert_eq!(s.delivered_at(), Some(delivered_at));
        assert_eq!(s.status(), ShipmentStatus::Delivered);

        // The latch is one-way: every further mutation fails, including a
        // second delivery, and the record is unchanged.
        for status in ShipmentStatus::ALL {
            let err = s.record_status(status, Utc::now()).unwrap_err();
            assert!(matches!(err, DomainError::Locked(_)));
        }
        assert_eq!(s.status(), ShipmentStatus::Delivered);
        assert_eq!(s.delivered_at(), Some(delivered_at));
    }
}
