//! OS keychain backend.

use keyring::Entry;

use super::{SecretError, SecretStore};

/// [`SecretStore`] backed by the platform keychain
/// (Secret Service, macOS Keychain, Windows Credential Manager).
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    /// Creates a keychain-backed store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn backend_error(service: &str, account: &str, err: &keyring::Error) -> SecretError {
    SecretError::Backend {
        service: service.to_string(),
        account: account.to_string(),
        reason: err.to_string(),
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, SecretError> {
        let entry = Entry::new(service, account).map_err(|e| backend_error(service, account, &e))?;

        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(backend_error(service, account, &e)),
        }
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), SecretError> {
        let entry = Entry::new(service, account).map_err(|e| backend_error(service, account, &e))?;
        entry
            .set_password(secret)
            .map_err(|e| backend_error(service, account, &e))?;

        tracing::debug!("Stored secret for {service}/{account}");
        Ok(())
    }
}
