use serde::{Deserialize, Serialize};

use dovic_core::UserId;

use crate::Role;

/// Authenticated identity resolved at the boundary.
///
/// The freight core never decodes tokens itself; it receives a `Principal`
/// (or its absence, for public/guest calls) as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    /// Display name as asserted by the identity provider.
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
