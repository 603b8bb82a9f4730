//! Storage seam for the freight core.
//!
//! Each trait method is one atomic unit of work. Multi-record operations
//! (`create_shipment`, `convert_quote`, `append_event`) commit all of their
//! records or none; the two integrity rules the ledger depends on are
//! enforced here, inside the unit of work:
//!
//! - milestone tracking statuses (`Booked`, `Picked Up`, `Delivered`) exist
//!   at most once per shipment,
//! - a delivered shipment accepts no further ledger writes, and
//! - a quote converts at most once: `convert_quote` checks the *stored*
//!   quote's shipment link, so a writer holding a stale read loses the race
//!   instead of silently repointing the link.

use async_trait::async_trait;

use dovic_core::{CustomerId, DomainError, QuoteId, ShipmentId, TrackingCode, TrackingEventId};
use dovic_quotes::Quote;
use dovic_shipments::{Shipment, ShipmentStatus};
use dovic_tracking::{Coordinates, TrackingEvent};

mod in_memory;
mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Storage-level failures, mapped onto the domain taxonomy at the seam.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// Unique tracking code or invoice number collision. Retryable: the
    /// caller regenerates both codes and tries again.
    #[error("tracking code or invoice number already in use")]
    DuplicateTrackingCode,

    /// A once-only milestone event already exists for the shipment.
    #[error("milestone status \"{0}\" already recorded for this shipment")]
    DuplicateMilestone(ShipmentStatus),

    /// Ledger write against a shipment whose delivered latch is set.
    #[error("shipment has already been delivered")]
    DeliveredLock,

    /// Conversion lost the race: the stored quote already links a shipment.
    #[error("quote has already been converted")]
    QuoteAlreadyConverted,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound,
            StoreError::DuplicateTrackingCode => {
                DomainError::conflict("tracking code or invoice number already in use")
            }
            StoreError::DuplicateMilestone(status) => DomainError::system_status_conflict(
                format!("milestone status \"{status}\" already recorded for this shipment"),
            ),
            StoreError::DeliveredLock => {
                DomainError::locked("shipment has already been delivered")
            }
            StoreError::QuoteAlreadyConverted => {
                DomainError::conflict("quote has already been converted")
            }
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::Backend(msg) => DomainError::Storage(msg),
        }
    }
}

/// Persistent freight state: quotes, shipments, tracking ledger.
#[async_trait]
pub trait FreightStore: Send + Sync {
    // Quotes.

    async fn insert_quote(&self, quote: &Quote) -> Result<(), StoreError>;

    /// Replace the stored quote (keyed by id). `NotFound` if never inserted.
    async fn update_quote(&self, quote: &Quote) -> Result<(), StoreError>;

    async fn get_quote(&self, id: QuoteId) -> Result<Quote, StoreError>;

    /// All quotes, newest first.
    async fn list_quotes(&self) -> Result<Vec<Quote>, StoreError>;

    /// A customer's quotes, newest first. Guest quotes never appear here.
    async fn list_quotes_for_customer(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<Quote>, StoreError>;

    // Shipments.

    /// Atomically insert a shipment together with its first (`Booked`)
    /// tracking event. Fails `DuplicateTrackingCode` on a code or invoice
    /// number collision, leaving nothing behind.
    async fn create_shipment(
        &self,
        shipment: &Shipment,
        first_event: &TrackingEvent,
    ) -> Result<(), StoreError>;

    /// The conversion unit of work: persist the converted quote, the new
    /// shipment and its first tracking event as one transaction. The stored
    /// quote, not the caller's read, arbitrates double conversion: fails
    /// `QuoteAlreadyConverted` when it already links a shipment.
    async fn convert_quote(
        &self,
        quote: &Quote,
        shipment: &Shipment,
        first_event: &TrackingEvent,
    ) -> Result<(), StoreError>;

    async fn get_shipment(&self, id: ShipmentId) -> Result<Shipment, StoreError>;

    async fn get_shipment_by_code(&self, code: &TrackingCode) -> Result<Shipment, StoreError>;

    /// All shipments, newest first.
    async fn list_shipments(&self) -> Result<Vec<Shipment>, StoreError>;

    /// Delete the shipment and cascade its tracking events. Irreversible.
    async fn delete_shipment(&self, id: ShipmentId) -> Result<(), StoreError>;

    // Tracking ledger.

    /// Append a tracking event and mirror its status onto the shipment, as
    /// one unit of work. Enforces the delivered latch (`DeliveredLock`) and
    /// milestone uniqueness (`DuplicateMilestone`). Returns the shipment as
    /// updated by the mirror.
    async fn append_event(&self, event: &TrackingEvent) -> Result<Shipment, StoreError>;

    /// Ledger rows for a shipment, `recorded_at` ascending with insertion
    /// order as the tiebreak.
    async fn list_events(&self, shipment: ShipmentId) -> Result<Vec<TrackingEvent>, StoreError>;

    /// One-shot coordinate enrichment (None -> Some only) after the owning
    /// transaction has committed.
    async fn set_event_coordinates(
        &self,
        id: TrackingEventId,
        coordinates: Coordinates,
    ) -> Result<(), StoreError>;
}
