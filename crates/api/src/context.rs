use dovic_auth::Principal;
use dovic_core::CustomerId;

/// The request's authenticated identity, if any.
///
/// Inserted by the auth middleware on every request. `None` is a legitimate
/// state: quote creation, tracking lookups and public invoices accept
/// anonymous callers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Principal>);

impl CurrentUser {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(Principal::is_admin)
    }

    /// Customer identity of the caller. Customer ids share the user's UUID.
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.0
            .as_ref()
            .filter(|p| !p.is_admin())
            .map(|p| CustomerId::from_uuid(*p.user_id.as_uuid()))
    }
}
