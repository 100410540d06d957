//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Directory under the user configuration directory holding all files.
pub const APP_DIR_NAME: &str = "ip-changed";

/// Name of the file holding the last known IP.
pub const STATE_FILE_NAME: &str = "ip.log";

/// Name of the JSON notification configuration file.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Scheduled job stdout log.
pub const STDOUT_LOG_NAME: &str = "ip-changed.log";

/// Scheduled job stderr log.
pub const STDERR_LOG_NAME: &str = "ip-changed.err";

/// Timeout for each IP source attempt, in seconds.
pub const SOURCE_TIMEOUT_SECS: u64 = 10;

/// Timeout for notification deliveries (HTTP and SMTP), in seconds.
pub const SEND_TIMEOUT_SECS: u64 = 30;

/// Implicit-TLS SMTP port.
pub const SMTP_PORT: u16 = 465;

/// Attempts allowed for each credential check during setup.
pub const MAX_SETUP_ATTEMPTS: u32 = 3;

/// Suggested check interval offered by the setup wizard, in minutes.
pub const CHECK_INTERVAL_MINUTES: u32 = 60;

/// Default mail subject template.
pub const SUBJECT_TEMPLATE: &str = "IP changed at {{location}}!";

/// Default mail body template.
pub const BODY_TEMPLATE: &str = "IP has changed from {{old_ip}} to {{new_ip}}";

/// Per-attempt source timeout as Duration.
#[must_use]
pub const fn source_timeout() -> Duration {
    Duration::from_secs(SOURCE_TIMEOUT_SECS)
}

/// Delivery timeout as Duration.
#[must_use]
pub const fn send_timeout() -> Duration {
    Duration::from_secs(SEND_TIMEOUT_SECS)
}
