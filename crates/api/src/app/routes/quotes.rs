use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::Utc;

use dovic_core::{DeliveryRange, QuoteId};
use dovic_quotes::Requester;

use crate::app::routes::common::{require_admin, require_auth, require_quote_access};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_quote).get(list_quotes))
        .route("/mine", get(my_quotes))
        .route("/:id", get(get_quote))
        .route("/:id/price", patch(price_quote))
        .route("/:id/accept", post(accept_quote))
        .route("/:id/decline", post(decline_quote))
        .route("/:id/shipment-details", post(submit_shipment_details))
        .route("/:id/reject", post(reject_quote))
        .route("/:id/convert", post(convert_quote))
}

fn parse_id(id: &str) -> Result<QuoteId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid quote id"))
}

/// Public/optional auth: an authenticated customer is the requester; anyone
/// else must supply a guest name and email.
pub async fn create_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<dto::CreateQuoteRequest>,
) -> axum::response::Response {
    let requester = match user.customer_id() {
        Some(customer) => Requester::Customer(customer),
        None => Requester::Guest {
            name: body.name.unwrap_or_default(),
            email: body.email.unwrap_or_default(),
        },
    };

    match services
        .quotes
        .create(requester, body.pickup, body.destination, body.weight_kg, Utc::now())
        .await
    {
        Ok(quote) => (StatusCode::CREATED, Json(dto::quote_to_json(&quote))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_quotes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    match services.quotes.list().await {
        Ok(quotes) => {
            let items: Vec<_> = quotes.iter().map(dto::quote_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn my_quotes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = require_auth(&user) {
        return resp;
    }
    let Some(customer) = user.customer_id() else {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "only customer accounts have their own quotes",
        );
    };
    match services.quotes.list_for_customer(customer).await {
        Ok(quotes) => {
            let items: Vec<_> = quotes.iter().map(dto::quote_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let quote = match services.quotes.get(id).await {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(resp) = require_quote_access(&user, &quote) {
        return resp;
    }
    (StatusCode::OK, Json(dto::quote_to_json(&quote))).into_response()
}

pub async fn price_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<dto::PriceQuoteRequest>,
) -> axum::response::Response {
    let admin = match require_admin(&user) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let delivery_range = match body.delivery_range.as_deref() {
        Some(s) => match s.parse::<DeliveryRange>() {
            Ok(r) => Some(r),
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => None,
    };

    match services
        .quotes
        .price(id, body.price, delivery_range, admin.user_id, Utc::now())
        .await
    {
        Ok(quote) => (StatusCode::OK, Json(dto::quote_to_json(&quote))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn accept_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    respond(&services, &user, &id, Decision::Accept).await
}

pub async fn decline_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    respond(&services, &user, &id, Decision::Decline).await
}

enum Decision {
    Accept,
    Decline,
}

async fn respond(
    services: &AppServices,
    user: &CurrentUser,
    id: &str,
    decision: Decision,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let quote = match services.quotes.get(id).await {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(resp) = require_quote_access(user, &quote) {
        return resp;
    }

    let result = match decision {
        Decision::Accept => services.quotes.accept(id, Utc::now()).await,
        Decision::Decline => services.quotes.decline(id, Utc::now()).await,
    };
    match result {
        Ok(quote) => (StatusCode::OK, Json(dto::quote_to_json(&quote))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn submit_shipment_details(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(details): Json<dovic_quotes::ShipmentDetails>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let quote = match services.quotes.get(id).await {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(resp) = require_quote_access(&user, &quote) {
        return resp;
    }

    match services.quotes.submit_details(id, details, Utc::now()).await {
        Ok(quote) => (StatusCode::OK, Json(dto::quote_to_json(&quote))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn reject_quote(
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
    match services.quotes.reject(id, Utc::now()).await {
        Ok(quote) => (StatusCode::OK, Json(dto::quote_to_json(&quote))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn convert_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Option<Json<dto::ConvertQuoteRequest>>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let details = body.and_then(|Json(b)| b.details);

    match services.conversion.convert(id, details, Utc::now()).await {
        Ok((quote, shipment)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "quote": dto::quote_to_json(&quote),
                "shipment": dto::shipment_to_json(&shipment),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
