use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use dovic_core::TrackingCode;
use dovic_shipments::ShipmentStatus;
use dovic_tracking::Coordinates;

use crate::app::routes::common::require_admin;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new().route("/:code", get(track).post(append_event))
}

fn parse_code(code: &str) -> Result<TrackingCode, axum::response::Response> {
    code.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            "invalid tracking code",
        )
    })
}

/// Public tracking lookup: shipment summary plus full ordered history.
pub async fn track(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code = match parse_code(&code) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match services.ledger.track(&code).await {
        Ok((shipment, events)) => {
            (StatusCode::OK, Json(dto::tracking_view(&shipment, &events))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Operator append. Milestone statuses are refused here; they belong to
/// booking, pickup confirmation and the delivery transition.
pub async fn append_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(code): Path<String>,
    Json(body): Json<dto::AppendTrackingRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    let code = match parse_code(&code) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let status = match body.status.parse::<ShipmentStatus>() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let coordinates = match (body.lat, body.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    };

    match services
        .ledger
        .append_manual(
            &code,
            status,
            body.city.unwrap_or_default(),
            body.country.unwrap_or_default(),
            body.message,
            coordinates,
            Utc::now(),
        )
        .await
    {
        Ok(event) => (StatusCode::CREATED, Json(dto::event_to_json(&event))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
