//! Mail address validation.

use std::sync::LazyLock;

use regex::Regex;

use super::ConfigError;

static MAIL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,})+$").expect("mail address regex is valid")
});

/// Returns true if `address` looks like a mail address.
#[must_use]
pub fn is_mail_address(address: &str) -> bool {
    MAIL_ADDRESS.is_match(address)
}

/// Validates a single address, returning it trimmed.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidMailAddress`] if it does not match.
pub fn parse_address(address: &str) -> Result<String, ConfigError> {
    let trimmed = address.trim();
    if is_mail_address(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidMailAddress {
            value: address.to_string(),
        })
    }
}

/// Validates a comma-separated list; every entry must be an address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidMailAddress`] naming the first bad entry.
/// An empty list is rejected as well.
pub fn parse_list(list: &str) -> Result<Vec<String>, ConfigError> {
    let addresses = list
        .split(',')
        .map(parse_address)
        .collect::<Result<Vec<_>, _>>()?;

    if addresses.is_empty() {
        return Err(ConfigError::InvalidMailAddress {
            value: list.to_string(),
        });
    }
    Ok(addresses)
}
