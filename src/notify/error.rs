//! Error types for notification delivery.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::HttpError;
use crate::secret::SecretError;

/// A notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// SMTP mail.
    Mail,
    /// Pushbullet push.
    Pushbullet,
    /// IFTTT Maker webhook.
    Ifttt,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mail => "mail",
            Self::Pushbullet => "pushbullet",
            Self::Ifttt => "ifttt",
        };
        f.write_str(name)
    }
}

/// Why a single channel could not deliver.
#[derive(Debug, Error)]
pub enum SendError {
    /// The mail server refused the credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The push service refused the API key.
    #[error("Invalid API key (HTTP {0})")]
    InvalidKey(http::StatusCode),

    /// The service could not be reached (DNS, connect, TLS, timeout).
    #[error("Connection failed: {0}")]
    Connectivity(String),

    /// The service answered but refused the notification.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The notification could not be built (bad address, bad URL).
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

impl SendError {
    /// Returns true for credential failures the setup wizard retries
    /// by asking for the secret again.
    #[must_use]
    pub const fn is_credential_error(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::InvalidKey(_))
    }
}

impl From<HttpError> for SendError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::InvalidUrl(reason) => Self::InvalidMessage(reason),
            other => Self::Connectivity(other.to_string()),
        }
    }
}

/// A channel that failed during dispatch, with its error.
#[derive(Debug)]
pub struct ChannelFailure {
    /// The failing channel
    pub channel: Channel,
    /// What went wrong
    pub error: SendError,
}

impl fmt::Display for ChannelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.channel, self.error)
    }
}

/// Errors from [`Dispatcher::notify`](super::Dispatcher::notify).
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No configuration file has been written yet.
    #[error("No notification config at '{}'. Run 'ip-changed setup' first", path.display())]
    MissingConfig {
        /// Expected location of `config.json`
        path: PathBuf,
    },

    /// The configuration file is unreadable or incomplete.
    #[error(transparent)]
    Config(ConfigError),

    /// A credential needed by an enabled channel is not stored.
    #[error("No credential stored for '{service}/{account}'. Run 'ip-changed setup' again")]
    MissingCredential {
        /// Secret store service
        service: &'static str,
        /// Secret store account
        account: String,
    },

    /// The secret store itself failed.
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// At least one channel failed; the others were still attempted.
    #[error("Notification failed on {}", format_failures(failures))]
    DeliveryFailed {
        /// Every failing channel, in dispatch order
        failures: Vec<ChannelFailure>,
    },
}

impl From<ConfigError> for NotifyError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::MissingConfig { path },
            other => Self::Config(other),
        }
    }
}

impl NotifyError {
    /// Returns true if the error comes from configuration or credentials
    /// rather than from delivery.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingConfig { .. } | Self::Config(_) | Self::MissingCredential { .. }
        )
    }
}

fn format_failures(failures: &[ChannelFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
