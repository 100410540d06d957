//! Registration of the periodic check in the user's crontab.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};

use thiserror::Error;

use crate::config::AppPaths;

/// Comment tagging the crontab line owned by this tool.
pub const JOB_MARKER: &str = "# ipchange_checker";

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Errors while registering the scheduled check.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The interval cannot be expressed as a single cron entry.
    #[error(
        "Invalid check interval {0} minutes: use 0 (at boot), 1-59, or a multiple of 60 up to 1440"
    )]
    InvalidInterval(u32),

    /// `crontab` could not be started or talked to.
    #[error("Failed to run crontab: {0}")]
    Spawn(#[from] io::Error),

    /// `crontab` ran but reported an error.
    #[error("crontab {action} failed: {stderr}")]
    Crontab {
        /// What was being done ("-l" or "-")
        action: &'static str,
        /// Captured standard error
        stderr: String,
    },
}

/// Converts a check interval in minutes to a cron schedule.
///
/// - `0` runs once per boot (`@reboot`)
/// - `1..=59` runs every N minutes
/// - multiples of 60 run every N hours, `1440` once a day
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidInterval`] for anything else.
pub fn cron_schedule(minutes: u32) -> Result<String, ScheduleError> {
    match minutes {
        0 => Ok("@reboot".to_string()),
        1..=59 => Ok(format!("*/{minutes} * * * *")),
        60 => Ok("0 * * * *".to_string()),
        MINUTES_PER_DAY => Ok("0 0 * * *".to_string()),
        m if m < MINUTES_PER_DAY && m % 60 == 0 => Ok(format!("0 */{} * * *", m / 60)),
        _ => Err(ScheduleError::InvalidInterval(minutes)),
    }
}

/// A crontab line running `check` and appending to the job logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    schedule: String,
    command: String,
}

impl ScheduledJob {
    /// Builds the job for `executable`, keeping every file under `paths`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidInterval`] if `minutes` has no cron
    /// form.
    pub fn new(executable: &Path, paths: &AppPaths, minutes: u32) -> Result<Self, ScheduleError> {
        let command = format!(
            "{} --config-dir {} check >> {} 2>> {}",
            shell_quote(executable),
            shell_quote(paths.dir()),
            shell_quote(&paths.stdout_log()),
            shell_quote(&paths.stderr_log()),
        );

        Ok(Self {
            schedule: cron_schedule(minutes)?,
            command,
        })
    }

    /// Returns the cron schedule part.
    #[must_use]
    pub fn schedule(&self) -> &str {
        &self.schedule
    }

    /// Returns the full crontab line, marker included.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{} {} {JOB_MARKER}", self.schedule, self.command)
    }
}

/// Quotes `path` for `/bin/sh` when it contains anything unusual.
fn shell_quote(path: &Path) -> String {
    let text = path.to_string_lossy();
    let plain = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:=@,".contains(c));

    if plain {
        text.into_owned()
    } else {
        format!("'{}'", text.replace('\'', r"'\''"))
    }
}

/// Replaces any previous tagged job in `existing` with `line`.
///
/// Other entries are kept in order; the result ends with a newline as
/// `crontab` requires.
#[must_use]
pub fn merge_crontab(existing: &str, line: &str) -> String {
    let mut lines: Vec<&str> = existing
        .lines()
        .filter(|l| !l.contains(JOB_MARKER))
        .collect();

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines.push(line);

    let mut table = lines.join("\n");
    table.push('\n');
    table
}

/// Installs a scheduled job.
pub trait Scheduler {
    /// Registers `job`, replacing an earlier registration.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] if the scheduler cannot be updated.
    fn install(&self, job: &ScheduledJob) -> Result<(), ScheduleError>;
}

impl<T: Scheduler> Scheduler for std::sync::Arc<T> {
    fn install(&self, job: &ScheduledJob) -> Result<(), ScheduleError> {
        (**self).install(job)
    }
}

/// [`Scheduler`] editing the current user's crontab.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrontabScheduler;

impl CrontabScheduler {
    fn read() -> Result<String, ScheduleError> {
        let output = Command::new("crontab").arg("-l").output()?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.to_lowercase().contains("no crontab") {
            return Ok(String::new());
        }
        Err(ScheduleError::Crontab {
            action: "-l",
            stderr: stderr.trim().to_string(),
        })
    }

    fn write(table: &str) -> Result<(), ScheduleError> {
        let mut child = Command::new("crontab")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let output = feed(child, table.as_bytes())?;
        if output.status.success() {
            return Ok(());
        }
        Err(ScheduleError::Crontab {
            action: "-",
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Writes `input` to the child's stdin, then waits for it.
///
/// The child is reaped even when the write fails; the write error is
/// reported after that.
fn feed(mut child: Child, input: &[u8]) -> Result<Output, ScheduleError> {
    let written = child
        .stdin
        .take()
        .map_or(Ok(()), |mut stdin| stdin.write_all(input));
    let output = child.wait_with_output()?;
    written?;
    Ok(output)
}

impl Scheduler for CrontabScheduler {
    fn install(&self, job: &ScheduledJob) -> Result<(), ScheduleError> {
        let current = Self::read()?;
        let merged = merge_crontab(&current, &job.line());
        Self::write(&merged)?;

        tracing::info!("Registered scheduled check: {}", job.line());
        Ok(())
    }
}
