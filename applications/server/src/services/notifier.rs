//! Outbound email notifications.
//!
//! The notifier is a fallible, possibly slow dependency. Callers bound every
//! send with [`send_with_timeout`], and the lead path never lets a failure
//! escape (see `LeadService`).

use crate::config::{MailSettings, MailTls};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("mail transport is not configured")]
    NotConfigured,

    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// Sends a plain-text email
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifierError>;
}

/// Run a send under a deadline
pub async fn send_with_timeout(
    notifier: &dyn Notifier,
    timeout: Duration,
    to: &str,
    subject: &str,
    text: &str,
) -> Result<(), NotifierError> {
    tokio::time::timeout(timeout, notifier.send(to, subject, text))
        .await
        .map_err(|_| NotifierError::Timeout(timeout))?
}

/// Build the notifier described by the mail settings.
///
/// Without an SMTP host this is a [`DisabledNotifier`].
pub fn from_settings(settings: &MailSettings) -> Result<Arc<dyn Notifier>, NotifierError> {
    if settings.host.is_none() {
        tracing::info!("No SMTP host configured, email notifications disabled");
        return Ok(Arc::new(DisabledNotifier));
    }

    Ok(Arc::new(SmtpNotifier::from_settings(settings)?))
}

/// SMTP notifier backed by `lettre`
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn from_settings(settings: &MailSettings) -> Result<Self, NotifierError> {
        let host = settings
            .host
            .as_deref()
            .ok_or(NotifierError::NotConfigured)?;
        let username = settings
            .username
            .as_deref()
            .ok_or(NotifierError::NotConfigured)?;

        let builder = match settings.tls_mode() {
            MailTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            MailTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            MailTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };

        let mut builder = builder
            .port(settings.port)
            .timeout(Some(settings.timeout()));

        if let Some(password) = &settings.password {
            builder = builder.credentials(Credentials::new(username.to_string(), password.clone()));
        }

        // "Centrum Heights" <leads@example.com>
        let from = Mailbox::new(Some(settings.sender_name.clone()), username.parse()?);

        tracing::info!(
            host = %host,
            port = settings.port,
            tls = ?settings.tls_mode(),
            "SMTP notifier configured"
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifierError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(text.to_string())?;

        self.transport.send(message).await?;
        tracing::debug!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

/// Used when no SMTP host is configured; every send fails
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, _to: &str, _subject: &str, _text: &str) -> Result<(), NotifierError> {
        Err(NotifierError::NotConfigured)
    }
}
