//! SMTP delivery of the rendered newsletter.
//!
//! STARTTLS with credentials; the password comes from the environment
//! (`SENDER_PASSWORD`), never from the config file.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::defaults::ENV_SENDER_PASSWORD;
use crate::config::EmailConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("message build error: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("missing SMTP password: set {ENV_SENDER_PASSWORD}")]
    MissingPassword,
    #[error("email is not configured (sender/recipient empty)")]
    NotConfigured,
}

/// Sends HTML reports over SMTP.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl EmailNotifier {
    /// Build a notifier from config plus the environment password.
    pub fn from_config(config: &EmailConfig) -> Result<Self, NotifyError> {
        if config.sender.is_empty() || config.recipient.is_empty() {
            return Err(NotifyError::NotConfigured);
        }
        let password =
            std::env::var(ENV_SENDER_PASSWORD).map_err(|_| NotifyError::MissingPassword)?;

        let sender: Mailbox = config.sender.parse()?;
        let recipient: Mailbox = config.recipient.parse()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.sender.clone(), password))
            .build();

        Ok(Self {
            transport,
            sender,
            recipient,
        })
    }

    pub async fn send(&self, subject: &str, html: String) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        self.transport.send(message).await?;
        info!(subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_email_is_rejected() {
        let config = EmailConfig::default();
        assert!(matches!(
            EmailNotifier::from_config(&config),
            Err(NotifyError::NotConfigured)
        ));
    }
}
