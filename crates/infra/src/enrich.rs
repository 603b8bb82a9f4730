//! Post-commit side effects.
//!
//! Geocoding and email run on spawned tasks after the owning unit of work has
//! committed. A failing collaborator degrades the data (null coordinates, a
//! missed email) and is logged at `warn`; it can never fail or delay the
//! operation it was enriching.

use std::sync::Arc;

use dovic_notify::{Geocoder, Mailer, OutboundEmail};
use dovic_tracking::TrackingEvent;

use crate::store::FreightStore;

/// Resolve the event's location to coordinates and write them back.
pub fn spawn_coordinate_enrichment(
    store: Arc<dyn FreightStore>,
    geocoder: Arc<dyn Geocoder>,
    event: &TrackingEvent,
) {
    if event.coordinates().is_some() {
        return;
    }
    let event_id = event.id();
    let city = event.city().to_string();
    let country = event.country().to_string();

    tokio::spawn(async move {
        let coordinates = match geocoder.geocode(&city, &country).await {
            Ok(Some(coordinates)) => coordinates,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(%event_id, %city, %country, error = %err, "geocoding failed");
                return;
            }
        };
        if let Err(err) = store.set_event_coordinates(event_id, coordinates).await {
            tracing::warn!(%event_id, error = %err, "coordinate enrichment write failed");
        }
    });
}

/// Send an email without waiting for (or surfacing) the outcome.
pub fn spawn_email(mailer: Arc<dyn Mailer>, email: OutboundEmail) {
    tokio::spawn(async move {
        let to = email.to.clone();
        if let Err(err) = mailer.send(email).await {
            tracing::warn!(%to, error = %err, "outbound email failed");
        }
    });
}
