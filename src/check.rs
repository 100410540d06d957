//! One IP check: resolve, compare with the stored address, persist and
//! notify.
//!
//! The state file is written before notifying, and only after a
//! successful resolution. A failed notification is therefore not retried
//! by the next run; it is reported through the error instead.

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;

use thiserror::Error;

use crate::http::HttpClient;
use crate::notify::{Notifier, NotifyError};
use crate::resolver::{IpResolver, ResolveError};
use crate::state::{LoadResult, StateError, StateStore};

/// Errors that end a check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// No source could report the public IP; nothing was written.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The new address could not be saved; nothing was sent.
    #[error("Failed to save state: {0}")]
    State(#[from] StateError),

    /// The state file exists but holds no usable address; it was left
    /// untouched.
    #[error("State file is corrupted: {reason}")]
    CorruptState {
        /// Why the file could not be used
        reason: String,
    },

    /// The address was saved but the notification failed.
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// What a successful check found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No previous address; `ip` was recorded without notifying.
    FirstRun {
        /// The resolved address
        ip: String,
    },
    /// The address is the recorded one; nothing was done.
    Unchanged {
        /// The resolved address
        ip: String,
    },
    /// The address changed and was recorded.
    Changed {
        /// The previously recorded address
        old_ip: String,
        /// The resolved address
        new_ip: String,
    },
}

/// Source of the current public IP.
///
/// Implemented by [`IpResolver`]; tests use a canned implementation.
pub trait IpProvider: Send + Sync {
    /// Returns the current public IP.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when no source is available.
    fn current_ip(&self) -> impl std::future::Future<Output = Result<String, ResolveError>> + Send;
}

impl<H: HttpClient> IpProvider for IpResolver<H> {
    fn current_ip(&self) -> impl std::future::Future<Output = Result<String, ResolveError>> + Send {
        self.resolve()
    }
}

/// Runs one check.
///
/// With `dry_run` the comparison is logged but neither the state file
/// nor any channel is touched.
///
/// # Errors
///
/// Returns [`CheckError`] if resolution, persistence or notification
/// fails, or if the state file is corrupted. Resolution failures and a
/// corrupted state file leave the state untouched.
pub async fn run_check<R, S, N>(
    provider: &R,
    store: &S,
    notifier: &N,
    dry_run: bool,
) -> Result<CheckOutcome, CheckError>
where
    R: IpProvider,
    S: StateStore + Sync,
    N: Notifier,
{
    let new_ip = provider.current_ip().await?;
    tracing::info!("Current IP: {new_ip}");

    let old_ip = match store.load() {
        LoadResult::Loaded(ip) => ip,
        LoadResult::NotFound => {
            tracing::info!("No previous IP recorded, recording {new_ip}");
            return first_run(store, new_ip, dry_run);
        }
        LoadResult::Corrupted { reason } => {
            tracing::error!("State file unusable: {reason}");
            return Err(CheckError::CorruptState { reason });
        }
    };

    if old_ip == new_ip {
        tracing::info!("IP has not changed");
        return Ok(CheckOutcome::Unchanged { ip: new_ip });
    }

    tracing::info!("IP has changed from {old_ip} to {new_ip}");
    if dry_run {
        tracing::info!("Dry run: state not updated, no notification sent");
        return Ok(CheckOutcome::Changed { old_ip, new_ip });
    }

    store.save(&new_ip)?;
    notifier.notify(&old_ip, &new_ip).await?;
    tracing::info!("Notification sent");

    Ok(CheckOutcome::Changed { old_ip, new_ip })
}

fn first_run<S: StateStore>(
    store: &S,
    ip: String,
    dry_run: bool,
) -> Result<CheckOutcome, CheckError> {
    if dry_run {
        tracing::info!("Dry run: state not written");
    } else {
        store.save(&ip)?;
    }
    Ok(CheckOutcome::FirstRun { ip })
}
