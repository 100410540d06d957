//! The JSON notification configuration file.
//!
//! The layout is shared with earlier releases of the tool: `port` may be a
//! number or a numeric string and `notification_type` may be the empty
//! string for "no extra channel".

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::ConfigError;

/// Extra channel notified alongside mail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    /// Mail only.
    #[default]
    #[serde(alias = "")]
    None,
    /// Pushbullet push notification.
    #[serde(alias = "push")]
    Pushbullet,
    /// IFTTT Maker webhook.
    #[serde(alias = "webhook")]
    Ifttt,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Pushbullet => "pushbullet",
            Self::Ifttt => "ifttt",
        };
        f.write_str(name)
    }
}

impl FromStr for NotificationType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "mail" => Ok(Self::None),
            "pushbullet" | "push" => Ok(Self::Pushbullet),
            "ifttt" | "webhook" => Ok(Self::Ifttt),
            _ => Err(ConfigError::InvalidNotificationType {
                value: s.to_string(),
            }),
        }
    }
}

/// Contents of `config.json`.
///
/// Every field is optional at this level; [`ValidatedConfig`] decides what
/// the selected channels actually require.
///
/// [`ValidatedConfig`]: super::ValidatedConfig
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Extra channel besides mail.
    #[serde(default)]
    pub notification_type: NotificationType,

    /// Sender mail address, also the SMTP login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Comma-separated receiver addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receivers: Option<String>,

    /// SMTP server host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp_server: Option<String>,

    /// SMTP implicit-TLS port.
    #[serde(
        default,
        deserialize_with = "deserialize_port",
        skip_serializing_if = "Option::is_none"
    )]
    pub port: Option<u16>,

    /// Label of the monitored location, included in every message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_address: Option<String>,

    /// IFTTT event name, present when `notification_type` is `ifttt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifttt_event: Option<String>,

    /// Whether the mail channel is used.
    #[serde(default = "enabled")]
    pub mail_enabled: bool,

    /// Handlebars override for the mail subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_template: Option<String>,

    /// Handlebars override for the mail body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_template: Option<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            notification_type: NotificationType::None,
            sender: None,
            receivers: None,
            smtp_server: None,
            port: None,
            house_address: None,
            ifttt_event: None,
            mail_enabled: true,
            subject_template: None,
            body_template: None,
        }
    }
}

const fn enabled() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Number(u16),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<PortRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortRepr::Number(port)) => Ok(Some(port)),
        Some(PortRepr::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(PortRepr::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid port '{text}'"))),
    }
}

impl NotificationConfig {
    /// Returns true if a configuration file exists at `path`.
    #[must_use]
    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Loads the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist, or a
    /// read/parse error otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Writes the configuration as pretty JSON, creating the parent
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        let write_error = |e| ConfigError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_error)?;
            }
        }

        std::fs::write(path, content).map_err(write_error)
    }
}
