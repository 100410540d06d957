//! SMTP mail delivery.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{MailSettings, defaults};

use super::{Note, SendError};

/// SMTP reply codes meaning the credentials were refused.
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// Trait for delivering a mail notification.
///
/// Separated from the SMTP implementation so the dispatcher and the
/// setup wizard can be tested without a mail server.
pub trait MailSender: Send + Sync {
    /// Sends `note` from `settings.sender` to every receiver.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] classified as authentication, connectivity,
    /// rejection or invalid message.
    fn send(
        &self,
        settings: &MailSettings,
        password: &str,
        note: &Note,
    ) -> impl std::future::Future<Output = Result<(), SendError>> + Send;
}

impl<T: MailSender> MailSender for std::sync::Arc<T> {
    fn send(
        &self,
        settings: &MailSettings,
        password: &str,
        note: &Note,
    ) -> impl std::future::Future<Output = Result<(), SendError>> + Send {
        (**self).send(settings, password, note)
    }
}

/// [`MailSender`] speaking implicit-TLS SMTP through `lettre`.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    timeout: Duration,
}

impl SmtpMailer {
    /// Creates a mailer with the default session timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: defaults::send_timeout(),
        }
    }

    /// Sets the SMTP session timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SmtpMailer {
    fn default() -> Self {
        Self::new()
    }
}

impl MailSender for SmtpMailer {
    async fn send(
        &self,
        settings: &MailSettings,
        password: &str,
        note: &Note,
    ) -> Result<(), SendError> {
        let message = build_message(settings, note)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_server)
            .map_err(|e| classify(&e))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.sender.clone(),
                password.to_string(),
            ))
            .timeout(Some(self.timeout))
            .build();

        tracing::debug!(
            "Sending mail via {}:{} to {} receiver(s)",
            settings.smtp_server,
            settings.port,
            settings.receivers.len()
        );
        transport.send(message).await.map_err(|e| classify(&e))?;
        Ok(())
    }
}

/// Builds the plain-text message addressed to every receiver.
///
/// # Errors
///
/// Returns [`SendError::InvalidMessage`] if an address does not parse.
pub fn build_message(settings: &MailSettings, note: &Note) -> Result<Message, SendError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&settings.sender)?)
        .subject(note.title.clone())
        .header(ContentType::TEXT_PLAIN);

    for receiver in &settings.receivers {
        builder = builder.to(parse_mailbox(receiver)?);
    }

    builder
        .body(note.body.clone())
        .map_err(|e| SendError::InvalidMessage(e.to_string()))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, SendError> {
    address
        .parse()
        .map_err(|e| SendError::InvalidMessage(format!("'{address}': {e}")))
}

fn classify(err: &lettre::transport::smtp::Error) -> SendError {
    match err.status() {
        Some(code) => classify_reply(&code.to_string(), err.to_string()),
        None => SendError::Connectivity(err.to_string()),
    }
}

/// Maps an SMTP reply code to the error kind it stands for.
fn classify_reply(code: &str, message: String) -> SendError {
    if AUTH_FAILURE_CODES.contains(&code) {
        SendError::Authentication(message)
    } else {
        SendError::Rejected(message)
    }
}
