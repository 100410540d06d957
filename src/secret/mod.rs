//! Credential storage.
//!
//! Passwords and API keys never live in `config.json`. They are kept in a
//! [`SecretStore`] keyed by a (service, account) pair, which is the OS
//! keychain ([`KeyringStore`]) outside of tests.

mod keychain;

pub use keychain::KeyringStore;

use thiserror::Error;

/// Keychain service holding the mail password; the account is the sender.
pub const MAIL_SERVICE: &str = "Mail-OutageDetector";

/// Keychain service holding the Pushbullet access token.
pub const PUSHBULLET_SERVICE: &str = "PushBullet-OutageDetector";

/// Account under which the Pushbullet access token is stored.
pub const PUSHBULLET_ACCOUNT: &str = "pushbullet";

/// Keychain service holding the IFTTT key; the account is the event name.
pub const IFTTT_SERVICE: &str = "IFTTT-OutageDetector";

/// Errors from the secret backend.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The backend refused or failed the operation.
    #[error("Secret store error for '{service}/{account}': {reason}")]
    Backend {
        /// Service part of the key
        service: String,
        /// Account part of the key
        account: String,
        /// Backend message
        reason: String,
    },
}

/// A (service, account) keyed secret store.
pub trait SecretStore: Send + Sync {
    /// Looks up a secret. A missing entry is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] if the backend cannot be queried.
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, SecretError>;

    /// Stores a secret, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] if the backend rejects the write.
    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), SecretError>;
}

impl<T: SecretStore> SecretStore for std::sync::Arc<T> {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, SecretError> {
        (**self).get(service, account)
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), SecretError> {
        (**self).set(service, account, secret)
    }
}
