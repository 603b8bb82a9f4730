//! `dovic-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod contact;
pub mod delivery;
pub mod error;
pub mod id;
pub mod tracking_code;

pub use contact::ContactInfo;
pub use delivery::DeliveryRange;
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, QuoteId, ShipmentId, TrackingEventId, UserId};
pub use tracking_code::{InvoiceNumber, TrackingCode};
