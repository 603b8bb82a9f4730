//! `dovic-infra` — storage and application services for the freight core.
//!
//! The [`store::FreightStore`] trait is the storage seam: an in-memory
//! implementation backs tests and zero-config deployments, a Postgres
//! implementation backs production. Every trait method is one atomic unit of
//! work; the store is where milestone uniqueness and the delivered latch are
//! finally resolved (never check-then-insert in the services).
//!
//! Services layered on the store:
//! - [`quotes::QuoteDesk`] — quote workflow operations.
//! - [`registry::ShipmentRegistry`] — shipment booking, status updates,
//!   deletion, dashboard reads.
//! - [`ledger::TrackingLedger`] — public tracking reads and manual appends.
//! - [`conversion::ConversionOrchestrator`] — quote-to-shipment conversion.

pub mod conversion;
pub mod enrich;
pub mod ledger;
pub mod quotes;
pub mod registry;
pub mod store;

pub use conversion::{ConversionOrchestrator, ConversionPolicy};
pub use ledger::TrackingLedger;
pub use quotes::QuoteDesk;
pub use registry::{RegistryStats, ShipmentRegistry};
pub use store::{FreightStore, InMemoryStore, PostgresStore, StoreError};
