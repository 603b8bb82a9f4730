use std::sync::Arc;

use axum::{Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::get};

use crate::app::routes::common::require_admin;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new().route("/stats", get(stats))
}

pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    match services.registry.stats().await {
        Ok(stats) => {
            let recent: Vec<_> = stats.recent_shipments.iter().map(dto::shipment_to_json).collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "total_shipments": stats.total_shipments,
                    "in_transit": stats.in_transit,
                    "delivered": stats.delivered,
                    "total_quotes": stats.total_quotes,
                    "pending_quotes": stats.pending_quotes,
                    "recent_shipments": recent,
                })),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
