//! Postgres-backed freight store.
//!
//! Entities are stored whole as JSONB payloads; the columns the store indexes
//! or constrains (ids, codes, status, timestamps) are duplicated alongside.
//! Integrity rules live in the schema:
//!
//! - `shipments.tracking_code` and `shipments.invoice_number` are UNIQUE,
//! - a partial unique index on `tracking_events (shipment_id, status)` covers
//!   the three milestone statuses only, so `23505` on an event insert always
//!   means a duplicate milestone,
//! - the conversion update matches only a quote row whose stored payload has
//!   no shipment link, so a stale read cannot convert a quote twice.
//!
//! `append_event` re-reads the shipment row `FOR UPDATE` inside its
//! transaction, so the delivered-latch check and the status mirror cannot
//! race a concurrent append.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};

use dovic_core::{CustomerId, QuoteId, ShipmentId, TrackingCode, TrackingEventId};
use dovic_quotes::Quote;
use dovic_shipments::Shipment;
use dovic_tracking::{Coordinates, TrackingEvent};

use super::{FreightStore, StoreError};

/// Postgres freight store. Cheap to clone; all operations go through the
/// thread-safe connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and verify the pool with the given database URL.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    async fn insert_shipment_tx(
        tx: &mut Transaction<'_, Postgres>,
        shipment: &Shipment,
    ) -> Result<(), StoreError> {
        let payload = to_payload(shipment)?;
        sqlx::query(
            r#"
            INSERT INTO shipments (
                id, tracking_code, invoice_number, customer_id,
                status, delivered, created_at, payload
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(shipment.id().as_uuid())
        .bind(shipment.tracking_code().as_str())
        .bind(shipment.invoice().number.as_str())
        .bind(shipment.customer().map(|c| *c.as_uuid()))
        .bind(shipment.status().label())
        .bind(shipment.is_delivered())
        .bind(shipment.created_at())
        .bind(payload)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateTrackingCode
            } else {
                map_sqlx_error("insert_shipment", e)
            }
        })?;
        Ok(())
    }

    async fn insert_event_tx(
        tx: &mut Transaction<'_, Postgres>,
        event: &TrackingEvent,
    ) -> Result<(), StoreError> {
        let payload = to_payload(event)?;
        sqlx::query(
            r#"
            INSERT INTO tracking_events (id, shipment_id, status, recorded_at, payload)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id().as_uuid())
        .bind(event.shipment().as_uuid())
        .bind(event.status().label())
        .bind(event.recorded_at())
        .bind(payload)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateMilestone(event.status())
            } else {
                map_sqlx_error("insert_event", e)
            }
        })?;
        Ok(())
    }

    async fn mirror_shipment_tx(
        tx: &mut Transaction<'_, Postgres>,
        shipment: &Shipment,
    ) -> Result<(), StoreError> {
        let payload = to_payload(shipment)?;
        sqlx::query(
            "UPDATE shipments SET status = $2, delivered = $3, payload = $4 WHERE id = $1",
        )
        .bind(shipment.id().as_uuid())
        .bind(shipment.status().label())
        .bind(shipment.is_delivered())
        .bind(payload)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("mirror_shipment", e))?;
        Ok(())
    }

    async fn update_quote_tx(
        tx: &mut Transaction<'_, Postgres>,
        quote: &Quote,
    ) -> Result<(), StoreError> {
        let payload = to_payload(quote)?;
        let result = sqlx::query("UPDATE quotes SET status = $2, payload = $3 WHERE id = $1")
            .bind(quote.id().as_uuid())
            .bind(quote.status().as_str())
            .bind(payload)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("update_quote", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Compare-and-swap quote update for conversion: matches only while the
    /// stored payload has no shipment link, so a writer holding a stale
    /// pre-conversion read loses the race instead of repointing the link.
    async fn convert_quote_tx(
        tx: &mut Transaction<'_, Postgres>,
        quote: &Quote,
    ) -> Result<(), StoreError> {
        let payload = to_payload(quote)?;
        let result = sqlx::query(
            r#"
            UPDATE quotes SET status = $2, payload = $3
            WHERE id = $1 AND payload->'shipment' = 'null'::jsonb
            "#,
        )
        .bind(quote.id().as_uuid())
        .bind(quote.status().as_str())
        .bind(payload)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("convert_quote", e))?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM quotes WHERE id = $1")
                .bind(quote.id().as_uuid())
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("convert_quote", e))?
                .is_some();
            return if exists {
                Err(StoreError::QuoteAlreadyConverted)
            } else {
                Err(StoreError::NotFound)
            };
        }
        Ok(())
    }
}

fn to_payload<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Backend(format!("serialize: {e}")))
}

fn from_payload<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Backend(format!("deserialize: {e}")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

async fn begin(pool: &PgPool) -> Result<Transaction<'_, Postgres>, StoreError> {
    pool.begin()
        .await
        .map_err(|e| map_sqlx_error("begin_transaction", e))
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), StoreError> {
    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("commit_transaction", e))
}

#[async_trait]
impl FreightStore for PostgresStore {
    async fn insert_quote(&self, quote: &Quote) -> Result<(), StoreError> {
        let payload = to_payload(quote)?;
        sqlx::query(
            r#"
            INSERT INTO quotes (id, customer_id, status, created_at, payload)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(quote.id().as_uuid())
        .bind(quote.customer_id().map(|c| *c.as_uuid()))
        .bind(quote.status().as_str())
        .bind(quote.created_at())
        .bind(payload)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_quote", e))?;
        Ok(())
    }

    async fn update_quote(&self, quote: &Quote) -> Result<(), StoreError> {
        let mut tx = begin(&self.pool).await?;
        Self::update_quote_tx(&mut tx, quote).await?;
        commit(tx).await
    }

    async fn get_quote(&self, id: QuoteId) -> Result<Quote, StoreError> {
        let row = sqlx::query("SELECT payload FROM quotes WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_quote", e))?
            .ok_or(StoreError::NotFound)?;
        from_payload(row.try_get("payload").map_err(|e| map_sqlx_error("get_quote", e))?)
    }

    async fn list_quotes(&self) -> Result<Vec<Quote>, StoreError> {
        let rows = sqlx::query("SELECT payload FROM quotes ORDER BY created_at DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_quotes", e))?;
        rows.into_iter()
            .map(|row| {
                from_payload(
                    row.try_get("payload")
                        .map_err(|e| map_sqlx_error("list_quotes", e))?,
                )
            })
            .collect()
    }

    async fn list_quotes_for_customer(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<Quote>, StoreError> {
        let rows = sqlx::query(
            "SELECT payload FROM quotes WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_quotes_for_customer", e))?;
        rows.into_iter()
            .map(|row| {
                from_payload(
                    row.try_get("payload")
                        .map_err(|e| map_sqlx_error("list_quotes_for_customer", e))?,
                )
            })
            .collect()
    }

    async fn create_shipment(
        &self,
        shipment: &Shipment,
        first_event: &TrackingEvent,
    ) -> Result<(), StoreError> {
        let mut tx = begin(&self.pool).await?;
        Self::insert_shipment_tx(&mut tx, shipment).await?;
        Self::insert_event_tx(&mut tx, first_event).await?;
        commit(tx).await
    }

    async fn convert_quote(
        &self,
        quote: &Quote,
        shipment: &Shipment,
        first_event: &TrackingEvent,
    ) -> Result<(), StoreError> {
        let mut tx = begin(&self.pool).await?;
        Self::convert_quote_tx(&mut tx, quote).await?;
        Self::insert_shipment_tx(&mut tx, shipment).await?;
        Self::insert_event_tx(&mut tx, first_event).await?;
        commit(tx).await
    }

    async fn get_shipment(&self, id: ShipmentId) -> Result<Shipment, StoreError> {
        let row = sqlx::query("SELECT payload FROM shipments WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_shipment", e))?
            .ok_or(StoreError::NotFound)?;
        from_payload(
            row.try_get("payload")
                .map_err(|e| map_sqlx_error("get_shipment", e))?,
        )
    }

    async fn get_shipment_by_code(&self, code: &TrackingCode) -> Result<Shipment, StoreError> {
        let row = sqlx::query("SELECT payload FROM shipments WHERE tracking_code = $1")
            .bind(code.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_shipment_by_code", e))?
            .ok_or(StoreError::NotFound)?;
        from_payload(
            row.try_get("payload")
                .map_err(|e| map_sqlx_error("get_shipment_by_code", e))?,
        )
    }

    async fn list_shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        let rows = sqlx::query("SELECT payload FROM shipments ORDER BY created_at DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_shipments", e))?;
        rows.into_iter()
            .map(|row| {
                from_payload(
                    row.try_get("payload")
                        .map_err(|e| map_sqlx_error("list_shipments", e))?,
                )
            })
            .collect()
    }

    async fn delete_shipment(&self, id: ShipmentId) -> Result<(), StoreError> {
        // tracking_events cascades via its foreign key.
        let result = sqlx::query("DELETE FROM shipments WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_shipment", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn append_event(&self, event: &TrackingEvent) -> Result<Shipment, StoreError> {
        let mut tx = begin(&self.pool).await?;

        let row = sqlx::query("SELECT payload FROM shipments WHERE id = $1 FOR UPDATE")
            .bind(event.shipment().as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("append_event", e))?
            .ok_or(StoreError::NotFound)?;
        let mut shipment: Shipment = from_payload(
            row.try_get("payload")
                .map_err(|e| map_sqlx_error("append_event", e))?,
        )?;

        if shipment.is_delivered() {
            return Err(StoreError::DeliveredLock);
        }

        // The milestone partial unique index arbitrates duplicates on insert.
        Self::insert_event_tx(&mut tx, event).await?;

        shipment
            .record_status(event.status(), event.recorded_at())
            .map_err(|e| StoreError::Conflict(e.to_string()))?;
        Self::mirror_shipment_tx(&mut tx, &shipment).await?;

        commit(tx).await?;
        Ok(shipment)
    }

    async fn list_events(&self, shipment: ShipmentId) -> Result<Vec<TrackingEvent>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT payload FROM tracking_events
            WHERE shipment_id = $1
            ORDER BY recorded_at ASC, seq ASC
            "#,
        )
        .bind(shipment.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_events", e))?;
        rows.into_iter()
            .map(|row| {
                from_payload(
                    row.try_get("payload")
                        .map_err(|e| map_sqlx_error("list_events", e))?,
                )
            })
            .collect()
    }

    async fn set_event_coordinates(
        &self,
        id: TrackingEventId,
        coordinates: Coordinates,
    ) -> Result<(), StoreError> {
        let coords = to_payload(&coordinates)?;
        // None -> Some only; a second enrichment finds a non-null value and
        // matches zero rows.
        let result = sqlx::query(
            r#"
            UPDATE tracking_events
            SET payload = jsonb_set(payload, '{coordinates}', $2)
            WHERE id = $1 AND payload->'coordinates' = 'null'::jsonb
            "#,
        )
        .bind(id.as_uuid())
        .bind(coords)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_event_coordinates", e))?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM tracking_events WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("set_event_coordinates", e))?
                .is_some();
            return if exists {
                Err(StoreError::Conflict(format!(
                    "tracking event {id} already has coordinates"
                )))
            } else {
                Err(StoreError::NotFound)
            };
        }
        Ok(())
    }
}
