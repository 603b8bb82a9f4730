//! Quote workflow service.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use dovic_core::{CustomerId, DeliveryRange, DomainResult, QuoteId, UserId};
use dovic_notify::{Mailer, OutboundEmail};
use dovic_quotes::{Quote, Requester, ShipmentDetails};

use crate::enrich::spawn_email;
use crate::store::FreightStore;

/// Operations over the quote state machine, persisted through the store.
///
/// Guards live on the [`Quote`] entity; this service loads, transitions and
/// saves, and fires the customer-facing emails after the save succeeds.
pub struct QuoteDesk {
    store: Arc<dyn FreightStore>,
    mailer: Arc<dyn Mailer>,
}

impl QuoteDesk {
    pub fn new(store: Arc<dyn FreightStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    pub async fn create(
        &self,
        requester: Requester,
        pickup: impl Into<String>,
        destination: impl Into<String>,
        weight_kg: f64,
        now: DateTime<Utc>,
    ) -> DomainResult<Quote> {
        let quote = Quote::create(requester, pickup, destination, weight_kg, now)?;
        self.store.insert_quote(&quote).await?;
        tracing::info!(quote_id = %quote.id(), "quote created");
        Ok(quote)
    }

    pub async fn price(
        &self,
        id: QuoteId,
        price: f64,
        delivery_range: Option<DeliveryRange>,
        priced_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Quote> {
        let mut quote = self.store.get_quote(id).await?;
        quote.price_quote(price, delivery_range, priced_by, now)?;
        self.store.update_quote(&quote).await?;

        if let Some(email) = quote.requester().email() {
            let range = quote.delivery_range().unwrap_or_default();
            spawn_email(
                self.mailer.clone(),
                OutboundEmail::quote_priced(email, price, range.label()),
            );
        }
        Ok(quote)
    }

    pub async fn accept(&self, id: QuoteId, now: DateTime<Utc>) -> DomainResult<Quote> {
        let mut quote = self.store.get_quote(id).await?;
        quote.accept(now)?;
        self.store.update_quote(&quote).await?;
        Ok(quote)
    }

    pub async fn decline(&self, id: QuoteId, now: DateTime<Utc>) -> DomainResult<Quote> {
        let mut quote = self.store.get_quote(id).await?;
        quote.decline(now)?;
        self.store.update_quote(&quote).await?;
        Ok(quote)
    }

    pub async fn submit_details(
        &self,
        id: QuoteId,
        details: ShipmentDetails,
        now: DateTime<Utc>,
    ) -> DomainResult<Quote> {
        let mut quote = self.store.get_quote(id).await?;
        quote.submit_shipment_details(details, now)?;
        self.store.update_quote(&quote).await?;
        Ok(quote)
    }

    pub async fn reject(&self, id: QuoteId, now: DateTime<Utc>) -> DomainResult<Quote> {
        let mut quote = self.store.get_quote(id).await?;
        quote.reject(now)?;
        self.store.update_quote(&quote).await?;
        Ok(quote)
    }

    pub async fn get(&self, id: QuoteId) -> DomainResult<Quote> {
        Ok(self.store.get_quote(id).await?)
    }

    pub async fn list(&self) -> DomainResult<Vec<Quote>> {
        Ok(self.store.list_quotes().await?)
    }

    pub async fn list_for_customer(&self, customer: CustomerId) -> DomainResult<Vec<Quote>> {
        Ok(self.store.list_quotes_for_customer(customer).await?)
    }
}
