//! Fire-and-forget outbound email.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// One outbound notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundEmail {
    pub fn shipment_booked(to: impl Into<String>, tracking_code: &str) -> Self {
        Self {
            to: to.into(),
            subject: "Your shipment is booked".to_string(),
            body: format!(
                "Your shipment has been booked. Track it any time with code {tracking_code}."
            ),
        }
    }

    pub fn quote_priced(to: impl Into<String>, price: f64, delivery_range: &str) -> Self {
        Self {
            to: to.into(),
            subject: "Your quote is ready".to_string(),
            body: format!(
                "Your shipping quote has been priced at {price:.2} USD ({delivery_range}). \
                 Log in or follow your quote link to accept or decline."
            ),
        }
    }

    pub fn status_updated(to: impl Into<String>, tracking_code: &str, status: &str) -> Self {
        Self {
            to: to.into(),
            subject: format!("Shipment {tracking_code}: {status}"),
            body: format!("Your shipment {tracking_code} is now \"{status}\"."),
        }
    }
}

/// Outbound email boundary.
///
/// Failure never blocks the core: callers log the error and move on.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

/// Mailer that only writes to the log. Default for dev/test deployments
/// without an email provider configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "outbound email (log only)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booked_email_mentions_the_tracking_code() {
        let email = OutboundEmail::shipment_booked("a@b.c", "DVX-2026-A9F3C21D");
        assert!(email.body.contains("DVX-2026-A9F3C21D"));
    }

    #[tokio::test]
    async fn log_mailer_never_fails() {
        let mailer = LogMailer;
        let email = OutboundEmail::status_updated("a@b.c", "DVX-2026-A9F3C21D", "In Transit");
        assert!(mailer.send(email).await.is_ok());
    }
}
