//! `dovic-quotes` — the quote workflow state machine.
//!
//! A quote negotiates price and shipment details with a customer before a
//! shipment is allowed to exist. All state transitions live here as pure
//! guarded mutations; persistence and HTTP are other crates' concerns.

pub mod quote;

pub use quote::{Quote, QuoteStatus, Requester, ShipmentDetails};
