//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from locating, parsing, validating and writing the
/// configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No per-user configuration directory could be determined.
    #[error("Could not determine the user configuration directory, pass --config-dir")]
    NoConfigDir,

    /// The configuration file does not exist.
    #[error("Config file '{}' not found", path.display())]
    NotFound {
        /// Expected location of the file
        path: PathBuf,
    },

    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the JSON configuration.
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        /// Path to the config file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the configuration.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to write the configuration file.
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A field needed by the enabled channels is absent.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing field
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// A mail address does not look like one.
    #[error("Invalid mail address '{value}'")]
    InvalidMailAddress {
        /// The rejected address (or list)
        value: String,
    },

    /// Unknown notification type.
    #[error("Invalid notification type '{value}': expected none, pushbullet or ifttt")]
    InvalidNotificationType {
        /// The invalid value provided
        value: String,
    },

    /// A message template does not compile.
    #[error("Invalid {field}: {reason}")]
    InvalidTemplate {
        /// Which template
        field: &'static str,
        /// Handlebars error message
        reason: String,
    },
}

/// Well-known field names for `MissingRequired` errors.
pub mod field {
    /// Sender mail address.
    pub const SENDER: &str = "sender";
    /// Comma-separated receiver addresses.
    pub const RECEIVERS: &str = "receivers";
    /// SMTP server host.
    pub const SMTP_SERVER: &str = "smtp_server";
    /// Location label.
    pub const HOUSE_ADDRESS: &str = "house_address";
    /// IFTTT event name.
    pub const IFTTT_EVENT: &str = "ifttt_event";
    /// Mail subject template.
    pub const SUBJECT_TEMPLATE: &str = "subject_template";
    /// Mail body template.
    pub const BODY_TEMPLATE: &str = "body_template";
}

/// Hint attached to every missing-field error.
pub const RERUN_SETUP_HINT: &str = "Run 'ip-changed setup' to recreate the configuration";

impl ConfigError {
    /// Creates a `MissingRequired` error for a required field.
    #[must_use]
    pub const fn missing(field: &'static str) -> Self {
        Self::MissingRequired {
            field,
            hint: RERUN_SETUP_HINT,
        }
    }
}
