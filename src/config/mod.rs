//! Configuration layer for ip-changed.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`], [`SetupArgs`])
//! - The JSON notification file ([`NotificationConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - File locations ([`AppPaths`])
//! - Mail address validation ([`address`])
//! - Default values ([`defaults`])
//!
//! # Sources
//!
//! The `check` command reads only the JSON file, and only when a change
//! has been detected. The `setup` command takes its answers from CLI
//! flags, which fall back to environment variables, and asks for anything
//! still missing.
//!
//! # Mail channel
//!
//! Mail is sent for every change unless `mail_enabled` is `false` in the
//! file. Pushbullet and IFTTT are sent in addition to mail, never instead.

pub mod address;
mod cli;
pub mod defaults;
mod error;
mod file;
mod paths;
mod validated;


pub use cli::{Cli, Command, SetupArgs};
pub use error::{ConfigError, RERUN_SETUP_HINT, field};
pub use file::{NotificationConfig, NotificationType};
pub use paths::AppPaths;
pub use validated::{ExtraChannel, MailSettings, ValidatedConfig, template_registry};
