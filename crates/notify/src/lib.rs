//! `dovic-notify` — external collaborators of the freight core.
//!
//! Geocoding and outbound email are side effects the core never waits on:
//! a failing geocoder degrades to null coordinates, a failing mailer is
//! logged and forgotten. Both are injected as trait objects; the core never
//! reaches into ambient process state for a client.

pub mod geocode;
pub mod mailer;

pub use geocode::{GeocodeError, Geocoder, NominatimGeocoder, NullGeocoder};
pub use mailer::{LogMailer, MailError, Mailer, OutboundEmail};
