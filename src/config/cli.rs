//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.
//! Setup flags fall back to the environment so the wizard can run
//! unattended (containers, provisioning scripts).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::file::NotificationType;

/// ip-changed: public IP change notifier
///
/// Checks the machine's public IP address and notifies you by mail,
/// Pushbullet or IFTTT when it changes. Meant to be run from cron.
#[derive(Debug, Parser)]
#[command(name = "ip-changed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (defaults to `check`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding config.json, ip.log and the job logs
    #[arg(long = "config-dir", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for ip-changed
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the public IP once and notify if it changed
    Check {
        /// Resolve and compare only; never write state or notify
        #[arg(long)]
        dry_run: bool,
    },

    /// Configure notifications and the scheduled check
    Setup(SetupArgs),
}

/// Answers for the setup wizard; anything left out is asked interactively.
#[derive(Debug, Clone, Default, Args)]
pub struct SetupArgs {
    /// Extra channel: none, pushbullet or ifttt
    #[arg(long = "notification-type", env = "NOTIFICATION_TYPE", value_name = "TYPE")]
    pub notification_type: Option<NotificationType>,

    /// Mail address notifications are sent from
    #[arg(long, env = "SENDER_MAIL_ADDRESS", value_name = "ADDRESS")]
    pub sender: Option<String>,

    /// Comma-separated mail addresses notifications are sent to
    #[arg(long, env = "RECEIVER_MAIL_ADDRESSES", value_name = "ADDRESS[,ADDRESS...]")]
    pub receivers: Option<String>,

    /// SMTP server of the sender's mail provider
    #[arg(long = "smtp-server", env = "SMTP_SERVER", value_name = "HOST")]
    pub smtp_server: Option<String>,

    /// Implicit-TLS port of the SMTP server
    #[arg(long = "smtp-port", env = "SMTP_SERVER_PORT", value_name = "PORT")]
    pub smtp_port: Option<u16>,

    /// Password of the sender mail account
    #[arg(long = "mail-password", env = "MAIL_PASSWORD", hide_env_values = true)]
    pub mail_password: Option<String>,

    /// IFTTT event name
    #[arg(long = "ifttt-event", env = "IFTTT_NAME", value_name = "EVENT")]
    pub ifttt_event: Option<String>,

    /// Pushbullet or IFTTT API key
    #[arg(
        long = "notification-key",
        env = "NOTIFICATION_PASSWORD",
        hide_env_values = true
    )]
    pub notification_key: Option<String>,

    /// Minutes between scheduled checks (0 = once per boot)
    #[arg(long, env = "IPCHANGE_CHECK", value_name = "MINUTES")]
    pub interval: Option<u32>,

    /// Description of the monitored location, used in messages
    #[arg(long, env = "HOUSE_ADDRESS", value_name = "TEXT")]
    pub location: Option<String>,

    /// Register the scheduled check without asking
    ///
    /// Any value of the environment variable other than a false-like one
    /// (`0`, `false`, `no`, `off`) turns this on.
    #[arg(long, env = "CRONTAB", value_parser = clap::builder::FalseyValueParser::new())]
    pub crontab: bool,

    /// Overwrite an existing configuration without asking
    #[arg(long)]
    pub reconfigure: bool,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}
