//! Request/response DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::{Value, json};

use dovic_quotes::{Quote, ShipmentDetails};
use dovic_shipments::{Invoice, Shipment};
use dovic_tracking::TrackingEvent;

// Requests.

#[derive(Debug, Deserialize)]
pub struct CreateQuoteRequest {
    pub pickup: String,
    pub destination: String,
    pub weight_kg: f64,
    /// Guest identity; ignored when the caller is an authenticated customer.
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceQuoteRequest {
    pub price: f64,
    pub delivery_range: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuoteRequest {
    #[serde(default)]
    pub details: Option<ShipmentDetails>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmPickupRequest {
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppendTrackingRequest {
    pub status: String,
    /// Optional at the wire level so a missing location comes back as the
    /// domain's validation error, not a deserialization rejection.
    pub city: Option<String>,
    pub country: Option<String>,
    pub message: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

// Responses.

pub fn quote_to_json(quote: &Quote) -> Value {
    json!({
        "id": quote.id().to_string(),
        "requester": quote.requester(),
        "pickup": quote.pickup(),
        "destination": quote.destination(),
        "weight_kg": quote.weight_kg(),
        "price": quote.price(),
        "delivery_range": quote.delivery_range().map(|r| r.label()),
        "status": quote.status().as_str(),
        "shipment_details": quote.shipment_details(),
        "shipment_id": quote.shipment().map(|id| id.to_string()),
        "created_at": quote.created_at(),
        "priced_at": quote.priced_at(),
        "decided_at": quote.decided_at(),
        "converted_at": quote.converted_at(),
    })
}

pub fn shipment_to_json(shipment: &Shipment) -> Value {
    json!({
        "id": shipment.id().to_string(),
        "tracking_code": shipment.tracking_code().as_str(),
        "quote_id": shipment.quote().map(|id| id.to_string()),
        "sender": shipment.sender(),
        "receiver": shipment.receiver(),
        "origin": shipment.origin(),
        "destination": shipment.destination(),
        "city": shipment.city(),
        "country": shipment.country(),
        "weight_kg": shipment.weight_kg(),
        "quantity": shipment.quantity(),
        "delivery_range": shipment.delivery_range().label(),
        "estimated_delivery": shipment.estimated_delivery(),
        "price": shipment.price(),
        "invoice": invoice_to_json(shipment.invoice()),
        "public_invoice": shipment.public_invoice(),
        "status": shipment.status().label(),
        "delivered": shipment.is_delivered(),
        "delivered_at": shipment.delivered_at(),
        "created_at": shipment.created_at(),
    })
}

pub fn invoice_to_json(invoice: &Invoice) -> Value {
    json!({
        "number": invoice.number.as_str(),
        "subtotal": invoice.subtotal,
        "tax_rate_percent": invoice.tax_rate_percent,
        "tax": invoice.tax,
        "discount": invoice.discount,
        "total": invoice.total,
        "currency": invoice.currency,
    })
}

pub fn event_to_json(event: &TrackingEvent) -> Value {
    json!({
        "id": event.id().to_string(),
        "status": event.status().label(),
        "city": event.city(),
        "country": event.country(),
        "location": event.location(),
        "coordinates": event.coordinates(),
        "message": event.message(),
        "recorded_at": event.recorded_at(),
    })
}

/// Public tracking page payload: shipment summary plus ordered history.
/// Contacts and the invoice are withheld from this unauthenticated view.
pub fn tracking_view(shipment: &Shipment, events: &[TrackingEvent]) -> Value {
    json!({
        "tracking_code": shipment.tracking_code().as_str(),
        "status": shipment.status().label(),
        "origin": shipment.origin(),
        "destination": shipment.destination(),
        "delivery_range": shipment.delivery_range().label(),
        "estimated_delivery": shipment.estimated_delivery(),
        "delivered": shipment.is_delivered(),
        "delivered_at": shipment.delivered_at(),
        "history": events.iter().map(event_to_json).collect::<Vec<_>>(),
    })
}
