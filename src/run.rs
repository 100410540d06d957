//! Command execution.
//!
//! This module wires the production implementations (reqwest, lettre,
//! OS keychain, crontab, terminal) into the library's check pipeline and
//! setup wizard.

use std::io;

use thiserror::Error;

use ip_changed::check::{CheckError, CheckOutcome, run_check};
use ip_changed::config::{AppPaths, ConfigError, RERUN_SETUP_HINT, SetupArgs};
use ip_changed::http::ReqwestClient;
use ip_changed::notify::{Dispatcher, SmtpMailer};
use ip_changed::resolver::IpResolver;
use ip_changed::secret::KeyringStore;
use ip_changed::setup::{ConsolePrompter, CrontabScheduler, SetupError, SetupOutcome, Wizard};
use ip_changed::state::FileStateStore;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Hint shown when the user declines to overwrite an existing setup.
const RECONFIGURE_HINT: &str =
    "Run 'ip-changed setup --reconfigure' to replace the existing configuration";

/// Error type for command execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The configuration directory or file is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The check failed.
    #[error("Check failed: {0}")]
    Check(#[from] CheckError),

    /// The setup wizard did not complete.
    #[error("Setup failed: {0}")]
    Setup(#[from] SetupError),

    /// The path of the running binary is needed for the scheduled job.
    #[error("Failed to locate the ip-changed executable: {0}")]
    Executable(#[source] io::Error),
}

impl RunError {
    /// Returns true if the error maps to the configuration exit code.
    ///
    /// Setup errors, configuration problems and missing credentials are
    /// configuration errors; resolution, state (including a corrupted
    /// state file) and delivery failures are runtime errors.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        match self {
            Self::Config(_) | Self::Setup(_) | Self::Executable(_) => true,
            Self::Check(CheckError::Notify(e)) => e.is_config_error(),
            Self::Check(_) => false,
        }
    }

    /// Returns a follow-up hint for errors the user can fix.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Setup(SetupError::Aborted) => Some(RECONFIGURE_HINT),
            Self::Config(ConfigError::NotFound { .. } | ConfigError::MissingRequired { .. }) => {
                Some(RERUN_SETUP_HINT)
            }
            Self::Check(CheckError::Notify(e)) if e.is_config_error() => Some(RERUN_SETUP_HINT),
            _ => None,
        }
    }
}

/// Runs one check against the files in `paths`.
///
/// # Errors
///
/// Returns [`RunError::Check`] if resolution, persistence or
/// notification fails.
#[cfg(not(tarpaulin_include))]
pub async fn execute_check(paths: &AppPaths, dry_run: bool) -> Result<CheckOutcome, RunError> {
    let client = ReqwestClient::new();
    let resolver = IpResolver::new(client.clone());
    let store = FileStateStore::new(paths.state_file());
    let dispatcher = Dispatcher::new(
        paths.config_file(),
        client,
        SmtpMailer::new(),
        KeyringStore::new(),
    );

    if dry_run {
        tracing::info!("Dry-run mode enabled - state and notifications are left untouched");
    }
    tracing::debug!("State file: {}", store.path().display());

    Ok(run_check(&resolver, &store, &dispatcher, dry_run).await?)
}

/// Runs the interactive setup wizard.
///
/// # Errors
///
/// Returns [`RunError::Setup`] if the wizard is aborted or fails, or
/// [`RunError::Executable`] if the binary path cannot be determined.
#[cfg(not(tarpaulin_include))]
pub async fn execute_setup(paths: AppPaths, args: SetupArgs) -> Result<SetupOutcome, RunError> {
    let executable = std::env::current_exe().map_err(RunError::Executable)?;

    let mut wizard = Wizard::new(
        paths,
        args,
        ConsolePrompter,
        SmtpMailer::new(),
        ReqwestClient::new(),
        KeyringStore::new(),
        CrontabScheduler,
    )
    .with_executable(executable);

    let outcome = wizard.run().await?;
    tracing::info!(
        "Setup complete (notification type: {}, scheduled: {})",
        outcome.config.notification_type,
        outcome.job.as_ref().map_or("no", |_| "yes")
    );
    Ok(outcome)
}
