//! Validated notification configuration.
//!
//! This module contains the configuration actually used by the dispatcher.
//! All validation happens during construction, before anything is sent.

use std::fmt;

use handlebars::Handlebars;

use super::address;
use super::defaults;
use super::error::{ConfigError, field};
use super::file::{NotificationConfig, NotificationType};

/// SMTP delivery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    /// Sender address, also the SMTP login.
    pub sender: String,
    /// Receiver addresses.
    pub receivers: Vec<String>,
    /// SMTP server host.
    pub smtp_server: String,
    /// Implicit-TLS port.
    pub port: u16,
}

/// Optional channel notified after mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraChannel {
    /// Mail only.
    None,
    /// Pushbullet push.
    Pushbullet,
    /// IFTTT Maker event.
    Ifttt {
        /// Event name to trigger
        event: String,
    },
}

/// Fully validated configuration ready for use by the dispatcher.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Mail settings, `None` when mail is disabled.
    pub mail: Option<MailSettings>,

    /// Extra channel selected by `notification_type`.
    pub extra: ExtraChannel,

    /// Location label included in every message.
    pub location: String,

    /// Mail subject template (Handlebars).
    pub subject_template: String,

    /// Mail body template (Handlebars).
    pub body_template: String,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mail = self.mail.as_ref().map_or_else(
            || "disabled".to_string(),
            |m| {
                format!(
                    "{} -> {} receiver(s) via {}:{}",
                    m.sender,
                    m.receivers.len(),
                    m.smtp_server,
                    m.port
                )
            },
        );
        let extra = match &self.extra {
            ExtraChannel::None => "none".to_string(),
            ExtraChannel::Pushbullet => "pushbullet".to_string(),
            ExtraChannel::Ifttt { event } => format!("ifttt({event})"),
        };

        write!(
            f,
            "Config {{ mail: {mail}, extra: {extra}, location: {} }}",
            self.location
        )
    }
}

impl ValidatedConfig {
    /// Validates a parsed configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A field required by an enabled channel is missing
    /// - A mail address is malformed
    /// - A template override does not compile
    pub fn from_file(file: &NotificationConfig) -> Result<Self, ConfigError> {
        let mail = if file.mail_enabled {
            Some(Self::resolve_mail(file)?)
        } else {
            None
        };

        let extra = match file.notification_type {
            NotificationType::None => ExtraChannel::None,
            NotificationType::Pushbullet => ExtraChannel::Pushbullet,
            NotificationType::Ifttt => ExtraChannel::Ifttt {
                event: required(file.ifttt_event.as_deref(), field::IFTTT_EVENT)?,
            },
        };

        let location = required(file.house_address.as_deref(), field::HOUSE_ADDRESS)?;

        let subject_template = file
            .subject_template
            .clone()
            .unwrap_or_else(|| defaults::SUBJECT_TEMPLATE.to_string());
        validate_template(field::SUBJECT_TEMPLATE, &subject_template)?;

        let body_template = file
            .body_template
            .clone()
            .unwrap_or_else(|| defaults::BODY_TEMPLATE.to_string());
        validate_template(field::BODY_TEMPLATE, &body_template)?;

        Ok(Self {
            mail,
            extra,
            location,
            subject_template,
            body_template,
        })
    }

    fn resolve_mail(file: &NotificationConfig) -> Result<MailSettings, ConfigError> {
        let sender = required(file.sender.as_deref(), field::SENDER)?;
        let sender = address::parse_address(&sender)?;

        let receivers = required(file.receivers.as_deref(), field::RECEIVERS)?;
        let receivers = address::parse_list(&receivers)?;

        let smtp_server = required(file.smtp_server.as_deref(), field::SMTP_SERVER)?;

        Ok(MailSettings {
            sender,
            receivers,
            smtp_server,
            port: file.port.unwrap_or(defaults::SMTP_PORT),
        })
    }
}

fn required(value: Option<&str>, name: &'static str) -> Result<String, ConfigError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ConfigError::missing(name))
}

/// Returns the Handlebars registry every notification text is rendered
/// with. Nothing rendered is HTML, so escaping is off.
#[must_use]
pub fn template_registry() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
}

fn validate_template(name: &'static str, template: &str) -> Result<(), ConfigError> {
    template_registry()
        .register_template_string(name, template)
        .map_err(|e| ConfigError::InvalidTemplate {
            field: name,
            reason: e.to_string(),
        })
}
