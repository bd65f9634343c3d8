pub mod smtp;
pub mod templates;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

pub use smtp::SmtpMailer;

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message and returns the id the transport assigned to it.
    async fn send(&self, mail: &OutgoingMail) -> Result<String>;
}

/// What happened to the notification that accompanies a successful mutation.
///
/// Kept apart from the mutation result so a caller can tell "created, but the
/// email failed" from "not created".
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// No recipient address was given.
    NotRequested,
    /// Mail is not configured.
    Skipped,
    Sent { message_id: String },
    Failed { reason: String },
}

impl NotificationOutcome {
    pub fn warning(&self) -> Option<&str> {
        match self {
            NotificationOutcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Hands a message to the mailer, if there is one. Never fails the caller.
pub async fn dispatch(mailer: Option<&dyn Mailer>, mail: OutgoingMail) -> NotificationOutcome {
    let Some(mailer) = mailer else {
        tracing::debug!(to = %mail.to, "Mail not configured, skipping notification");
        return NotificationOutcome::Skipped;
    };

    match mailer.send(&mail).await {
        Ok(message_id) => {
            tracing::info!(to = %mail.to, message_id = %message_id, "Notification sent");
            NotificationOutcome::Sent { message_id }
        }
        Err(e) => {
            tracing::warn!(to = %mail.to, error = %e, "Notification could not be sent");
            NotificationOutcome::Failed {
                reason: "The email could not be sent. You can resend it later.".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _mail: &OutgoingMail) -> Result<String> {
            Err(AppError::Mail("connection refused".to_string()))
        }
    }

    fn mail() -> OutgoingMail {
        OutgoingMail {
            to: "max@example.com".to_string(),
            subject: "Hello".to_string(),
            html_body: "<p>Hello</p>".to_string(),
            text_body: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_mailer_is_skipped() {
        let outcome = dispatch(None, mail()).await;
        assert_eq!(outcome, NotificationOutcome::Skipped);
        assert!(outcome.warning().is_none());
    }

    #[tokio::test]
    async fn test_failure_becomes_soft_warning() {
        let outcome = dispatch(Some(&FailingMailer), mail()).await;
        assert!(matches!(outcome, NotificationOutcome::Failed { .. }));
        let warning = outcome.warning().unwrap();
        assert!(!warning.contains("connection refused"));
    }
}
