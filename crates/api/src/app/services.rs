//! Service wiring: store selection and the application services.

use std::sync::Arc;

use dovic_infra::{
    ConversionOrchestrator, ConversionPolicy, FreightStore, InMemoryStore, PostgresStore,
    QuoteDesk, ShipmentRegistry, TrackingLedger,
};
use dovic_notify::{Geocoder, LogMailer, Mailer, NominatimGeocoder, NullGeocoder};

/// The four application services, sharing one store and one set of
/// collaborators.
pub struct AppServices {
    pub quotes: QuoteDesk,
    pub registry: ShipmentRegistry,
    pub ledger: TrackingLedger,
    pub conversion: ConversionOrchestrator,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn FreightStore>,
        geocoder: Arc<dyn Geocoder>,
        mailer: Arc<dyn Mailer>,
        policy: ConversionPolicy,
    ) -> Self {
        Self {
            quotes: QuoteDesk::new(store.clone(), mailer.clone()),
            registry: ShipmentRegistry::new(store.clone(), geocoder.clone(), mailer.clone()),
            ledger: TrackingLedger::new(store.clone(), geocoder.clone()),
            conversion: ConversionOrchestrator::new(store, geocoder, mailer, policy),
        }
    }
}

/// Wire services from the environment.
///
/// - `DATABASE_URL` set: Postgres store (panics on connection failure, the
///   process is useless without its store).
/// - `GEOCODER_BASE_URL` overrides the Nominatim endpoint; the value `off`
///   disables geocoding entirely.
pub async fn build_services() -> AppServices {
    let store: Arc<dyn FreightStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = PostgresStore::connect(&url)
                .await
                .expect("failed to connect to DATABASE_URL");
            tracing::info!("using postgres store");
            Arc::new(store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    let geocoder: Arc<dyn Geocoder> = match std::env::var("GEOCODER_BASE_URL").ok().as_deref() {
        Some("off") => Arc::new(NullGeocoder),
        Some(url) => Arc::new(NominatimGeocoder::with_base_url(url)),
        None => Arc::new(NominatimGeocoder::new()),
    };

    AppServices::new(
        store,
        geocoder,
        Arc::new(LogMailer),
        ConversionPolicy::default(),
    )
}
