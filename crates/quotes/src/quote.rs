use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dovic_core::{
    ContactInfo, CustomerId, DeliveryRange, DomainError, DomainResult, QuoteId, ShipmentId,
    UserId,
};

/// Who asked for the quote: a registered customer or a one-off guest.
///
/// Exactly one variant is ever set; the boundary resolves this once and the
/// workflow never re-derives it from ambient auth state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requester {
    Customer(CustomerId),
    Guest { name: String, email: String },
}

impl Requester {
    pub fn customer_id(&self) -> Option<CustomerId> {
        match self {
            Requester::Customer(id) => Some(*id),
            Requester::Guest { .. } => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Requester::Customer(_) => None,
            Requester::Guest { email, .. } => Some(email.as_str()),
        }
    }

    fn validate(&self) -> DomainResult<()> {
        if let Requester::Guest { name, email } = self {
            if name.trim().is_empty() {
                return Err(DomainError::validation(
                    "guest name is required for guest quotes",
                ));
            }
            if !email.contains('@') {
                return Err(DomainError::validation(
                    "a valid guest email is required for guest quotes",
                ));
            }
        }
        Ok(())
    }
}

/// Quote lifecycle. Terminal states: `Declined`, `Rejected`, `Converted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteStatus {
    Pending,
    Priced,
    Accepted,
    Declined,
    ReadyForShipment,
    Rejected,
    Converted,
}

impl QuoteStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QuoteStatus::Declined | QuoteStatus::Rejected | QuoteStatus::Converted
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "Pending",
            QuoteStatus::Priced => "Priced",
            QuoteStatus::Accepted => "Accepted",
            QuoteStatus::Declined => "Declined",
            QuoteStatus::ReadyForShipment => "ReadyForShipment",
            QuoteStatus::Rejected => "Rejected",
            QuoteStatus::Converted => "Converted",
        }
    }
}

impl core::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipment details the customer submits after accepting a priced quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentDetails {
    pub sender: ContactInfo,
    pub receiver: ContactInfo,
    pub city: String,
    pub country: String,
    pub quantity: u32,
}

impl ShipmentDetails {
    pub fn validate(&self) -> DomainResult<()> {
        self.sender.validate("sender")?;
        self.receiver.validate("receiver")?;
        if self.city.trim().is_empty() {
            return Err(DomainError::validation("city is required"));
        }
        if self.country.trim().is_empty() {
            return Err(DomainError::validation("country is required"));
        }
        if self.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        Ok(())
    }
}

/// A price negotiation for a prospective shipment.
///
/// Never physically deleted; mutated only through the documented transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    id: QuoteId,
    requester: Requester,
    pickup: String,
    destination: String,
    weight_kg: f64,
    price: Option<f64>,
    delivery_range: Option<DeliveryRange>,
    status: QuoteStatus,
    shipment_details: Option<ShipmentDetails>,
    shipment: Option<ShipmentId>,
    created_at: DateTime<Utc>,
    priced_at: Option<DateTime<Utc>>,
    priced_by: Option<UserId>,
    decided_at: Option<DateTime<Utc>>,
    details_submitted_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    converted_at: Option<DateTime<Utc>>,
}

impl Quote {
    /// Create a new quote in `Pending`.
    ///
    /// Requires pickup, destination and a positive weight; requires exactly
    /// one requester variant (enforced by construction, validated for guests).
    pub fn create(
        requester: Requester,
        pickup: impl Into<String>,
        destination: impl Into<String>,
        weight_kg: f64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let pickup = pickup.into();
        let destination = destination.into();

        requester.validate()?;
        if pickup.trim().is_empty() {
            return Err(DomainError::validation("pickup is required"));
        }
        if destination.trim().is_empty() {
            return Err(DomainError::validation("destination is required"));
        }
        if !(weight_kg > 0.0) {
            return Err(DomainError::validation("weight must be greater than zero"));
        }

        Ok(Self {
            id: QuoteId::new(),
            requester,
            pickup,
            destination,
            weight_kg,
            price: None,
            delivery_range: None,
            status: QuoteStatus::Pending,
            shipment_details: None,
            shipment: None,
            created_at: now,
            priced_at: None,
            priced_by: None,
            decided_at: None,
            details_submitted_at: None,
            rejected_at: None,
            converted_at: None,
        })
    }

    pub fn id(&self) -> QuoteId {
        self.id
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.requester.customer_id()
    }

    pub fn pickup(&self) -> &str {
        &self.pickup
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn delivery_range(&self) -> Option<DeliveryRange> {
        self.delivery_range
    }

    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    pub fn shipment_details(&self) -> Option<&ShipmentDetails> {
        self.shipment_details.as_ref()
    }

    pub fn shipment(&self) -> Option<ShipmentId> {
        self.shipment
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn priced_at(&self) -> Option<DateTime<Utc>> {
        self.priced_at
    }

    pub fn priced_by(&self) -> Option<UserId> {
        self.priced_by
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    pub fn converted_at(&self) -> Option<DateTime<Utc>> {
        self.converted_at
    }

    fn guard(&self, allowed: &[QuoteStatus], attempted: &str) -> DomainResult<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(
                self.status.as_str(),
                attempted,
            ))
        }
    }

    /// Price the quote: only from `Pending`, price must be positive.
    ///
    /// Price and delivery range are set together; the range defaults to
    /// `Standard` when the operator does not specify one.
    pub fn price_quote(
        &mut self,
        price: f64,
        delivery_range: Option<DeliveryRange>,
        priced_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.guard(&[QuoteStatus::Pending], "price")?;
        if !(price > 0.0) {
            return Err(DomainError::validation("price must be greater than zero"));
        }

        self.price = Some(price);
        self.delivery_range = Some(delivery_range.unwrap_or_default());
        self.priced_by = Some(priced_by);
        self.priced_at = Some(now);
        self.status = QuoteStatus::Priced;
        Ok(())
    }

    /// Customer accepts the priced quote.
    pub fn accept(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.guard(&[QuoteStatus::Priced], "accept")?;
        self.decided_at = Some(now);
        self.status = QuoteStatus::Accepted;
        Ok(())
    }

    /// Customer declines the priced quote. Terminal.
    pub fn decline(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.guard(&[QuoteStatus::Priced], "decline")?;
        self.decided_at = Some(now);
        self.status = QuoteStatus::Declined;
        Ok(())
    }

    /// Customer submits (or re-submits) the shipment detail block.
    ///
    /// Only from `Accepted` or `ReadyForShipment`; re-submission before
    /// conversion simply overwrites the pending details.
    pub fn submit_shipment_details(
        &mut self,
        details: ShipmentDetails,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.guard(
            &[QuoteStatus::Accepted, QuoteStatus::ReadyForShipment],
            "submit shipment details",
        )?;
        details.validate()?;

        self.shipment_details = Some(details);
        self.details_submitted_at = Some(now);
        self.status = QuoteStatus::ReadyForShipment;
        Ok(())
    }

    /// Administrative override: reject before any customer decision is final.
    pub fn reject(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.guard(&[QuoteStatus::Pending, QuoteStatus::Priced], "reject")?;
        self.rejected_at = Some(now);
        self.status = QuoteStatus::Rejected;
        Ok(())
    }

    /// Mark converted and link the resulting shipment. Called only by the
    /// conversion orchestrator inside its atomic unit of work.
    pub fn mark_converted(
        &mut self,
        shipment: ShipmentId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.guard(
            &[QuoteStatus::Accepted, QuoteStatus::ReadyForShipment],
            "convert",
        )?;
        if self.shipment.is_some() {
            return Err(DomainError::conflict(format!(
                "quote {} is already linked to a shipment",
                self.id
            )));
        }

        self.shipment = Some(shipment);
        self.converted_at = Some(now);
        self.status = QuoteStatus::Converted;
        Ok(())
    }
}
