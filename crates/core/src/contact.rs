//! Contact blocks shared by quotes and shipments.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Sender or receiver contact block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ContactInfo {
    /// Validate completeness of the block.
    ///
    /// `role` names the side being validated ("sender"/"receiver") so error
    /// messages point at the offending block.
    pub fn validate(&self, role: &str) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation(format!("{role} name is required")));
        }
        if self.phone.trim().is_empty() {
            return Err(DomainError::validation(format!("{role} phone is required")));
        }
        if self.address.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "{role} address is required"
            )));
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(DomainError::validation(format!(
                    "{role} email is malformed"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactInfo {
        ContactInfo {
            name: "Ada Obi".to_string(),
            phone: "+2348012345678".to_string(),
            address: "12 Marina Rd, Lagos".to_string(),
            email: None,
        }
    }

    #[test]
    fn complete_contact_passes_validation() {
        assert!(contact().validate("sender").is_ok());
    }

    #[test]
    fn missing_phone_fails_with_role_in_message() {
        let mut c = contact();
        c.phone = "  ".to_string();
        let err = c.validate("receiver").unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("receiver phone") => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut c = contact();
        c.email = Some("not-an-email".to_string());
        assert!(c.validate("sender").is_err());
    }
}
