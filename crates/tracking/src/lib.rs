//! `dovic-tracking` — tracking ledger rows.
//!
//! One immutable event per status/location milestone of a shipment. The
//! ledger's integrity rules (once-only milestones, delivered lock, mirror
//! atomicity) are enforced by the store in `dovic-infra`; this crate holds
//! the row shape itself.

pub mod event;

pub use event::{Coordinates, TrackingEvent};
