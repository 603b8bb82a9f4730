use axum::http::StatusCode;

use dovic_auth::Principal;
use dovic_quotes::Quote;
use dovic_shipments::Shipment;

use crate::app::errors;
use crate::context::CurrentUser;

pub fn require_auth(user: &CurrentUser) -> Result<&Principal, axum::response::Response> {
    user.principal().ok_or_else(|| {
        errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "authentication required",
        )
    })
}

pub fn require_admin(user: &CurrentUser) -> Result<&Principal, axum::response::Response> {
    let principal = require_auth(user)?;
    if !principal.is_admin() {
        return Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "admin role required",
        ));
    }
    Ok(principal)
}

/// Admins and the owning customer may act on a quote. Guest quotes have no
/// owning account, so only admins reach them once created.
pub fn require_quote_access(
    user: &CurrentUser,
    quote: &Quote,
) -> Result<(), axum::response::Response> {
    require_auth(user)?;
    if user.is_admin() || (quote.customer_id().is_some() && quote.customer_id() == user.customer_id())
    {
        return Ok(());
    }
    Err(errors::json_error(
        StatusCode::FORBIDDEN,
        "forbidden",
        format!("quote {} does not belong to the caller", quote.id()),
    ))
}

pub fn owns_shipment(user: &CurrentUser, shipment: &Shipment) -> bool {
    shipment.customer().is_some() && shipment.customer() == user.customer_id()
}
