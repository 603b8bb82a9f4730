use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::Utc;

use dovic_core::{ShipmentId, TrackingCode};
use dovic_shipments::{NewShipment, ShipmentStatus};

use crate::app::routes::common::{owns_shipment, require_admin};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_shipment).get(list_shipments))
        .route("/:id/status", patch(update_status))
        .route("/:id/pickup", post(confirm_pickup))
        .route("/:id", delete(delete_shipment))
        // The invoice read is keyed by tracking code; the segment shares the
        // `:id` name because the router requires one name per position.
        .route("/:id/invoice", get(get_invoice))
}

fn parse_id(id: &str) -> Result<ShipmentId, axum::response::Response> {
    id.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid shipment id")
    })
}

/// Walk-in booking by an operator, bypassing the quote workflow.
pub async fn create_shipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(spec): Json<NewShipment>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    match services.registry.create(spec, Utc::now()).await {
        Ok(shipment) => {
            (StatusCode::CREATED, Json(dto::shipment_to_json(&shipment))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_shipments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    match services.registry.list().await {
        Ok(shipments) => {
            let items: Vec<_> = shipments.iter().map(dto::shipment_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let status = match body.status.parse::<ShipmentStatus>() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .registry
        .update_status(id, status, body.city, body.country, body.message, Utc::now())
        .await
    {
        Ok(shipment) => (StatusCode::OK, Json(dto::shipment_to_json(&shipment))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn confirm_pickup(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Option<Json<dto::ConfirmPickupRequest>>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = body.map(|Json(b)| b).unwrap_or_default();

    match services
        .registry
        .confirm_pickup(id, body.city, body.country, Utc::now())
        .await
    {
        Ok(shipment) => (StatusCode::OK, Json(dto::shipment_to_json(&shipment))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_shipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.registry.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Invoice read keyed by tracking code. Open to admins, the owning
/// customer, and everyone when the shipment's invoice is flagged public.
pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code: TrackingCode = match code.parse() {
        Ok(c) => c,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid tracking code",
            );
        }
    };
    let shipment = match services.registry.get_by_code(&code).await {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if !(shipment.public_invoice() || user.is_admin() || owns_shipment(&user, &shipment)) {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "this invoice is not public",
        );
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "tracking_code": shipment.tracking_code().as_str(),
            "invoice": dto::invoice_to_json(shipment.invoice()),
        })),
    )
        .into_response()
}
