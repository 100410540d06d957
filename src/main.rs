//! ip-changed: public IP change notifier
//!
//! Entry point for the ip-changed application.

use std::process::ExitCode;

use ip_changed::config::{AppPaths, Cli, Command};

mod app;
mod run;

use app::{exit_code, print_error_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_tracing(cli.verbose);

    let paths = match AppPaths::resolve(cli.config_dir.as_deref()) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return exit_code::CONFIG_ERROR;
        }
    };
    tracing::debug!("Using config directory {}", paths.dir().display());

    let command = cli.command.unwrap_or(Command::Check { dry_run: false });
    run_application(paths, command)
}

/// Runs the selected command on a single-threaded runtime.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(paths: AppPaths, command: Command) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    let result = match command {
        Command::Check { dry_run } => runtime
            .block_on(run::execute_check(&paths, dry_run))
            .map(|_| ()),
        Command::Setup(args) => runtime.block_on(run::execute_setup(paths, args)).map(|_| ()),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            print_error_hint(&e);
            if e.is_config_error() {
                exit_code::CONFIG_ERROR
            } else {
                exit_code::runtime_error()
            }
        }
    }
}
