//! `dovic-shipments` — the shipment registry's domain model.
//!
//! A shipment is the registered, trackable physical consignment created after
//! a quote is finalized (or booked directly by an operator). This crate holds
//! the entity, its status lifecycle, and the deterministic invoice
//! computation; persistence and the ledger wiring live in `dovic-infra`.

pub mod invoice;
pub mod shipment;
pub mod status;

pub use invoice::{Invoice, tax_rate_percent_for};
pub use shipment::{NewShipment, Shipment};
pub use status::ShipmentStatus;
