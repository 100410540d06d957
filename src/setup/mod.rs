//! Interactive first-run configuration.
//!
//! The [`Wizard`] asks for (or takes from [`SetupArgs`]) everything the
//! `check` command needs, proves the credentials work by sending real test
//! notifications, then writes `config.json`, stores the secrets and
//! optionally registers the scheduled check.
//!
//! Every question is a loop: invalid answers are asked again, credential
//! failures are retried up to [`defaults::MAX_SETUP_ATTEMPTS`] times.

mod prompt;
mod schedule;

#[cfg(test)]
#[path = "wizard_tests.rs"]
mod tests;

pub use prompt::{ConsolePrompter, PromptError, Prompter, ask_non_empty, ask_until, choose, confirm};
pub use schedule::{
    CrontabScheduler, JOB_MARKER, ScheduleError, ScheduledJob, Scheduler, cron_schedule,
    merge_crontab,
};

#[cfg(test)]
pub use prompt::mock::ScriptedPrompter;
#[cfg(test)]
pub use schedule::mock::MockScheduler;

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{
    AppPaths, ConfigError, MailSettings, NotificationConfig, NotificationType, SetupArgs, address,
    defaults,
};
use crate::http::HttpClient;
use crate::notify::{Channel, IftttSender, MailSender, Note, PushbulletSender, SendError};
use crate::secret::{
    IFTTT_SERVICE, MAIL_SERVICE, PUSHBULLET_ACCOUNT, PUSHBULLET_SERVICE, SecretError, SecretStore,
};

const TEST_MAIL_SUBJECT: &str = "IP Change Detector - Testing mail notification";
const TEST_MAIL_BODY: &str = "Mail sent successfully!";
const TEST_PUSH_TITLE: &str = "Testing Pushbullet key";
const TEST_PUSH_BODY: &str = "Test is successful!";
const TEST_IFTTT_VALUE: &str = "Testing IFTTT";

/// SMTP presets for providers recognised from the sender domain.
const KNOWN_PROVIDERS: [(&str, &str); 2] = [
    ("gmail", "smtp.gmail.com"),
    ("yahoo", "smtp.mail.yahoo.com"),
];

/// Errors that end the setup wizard.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The user chose to keep the existing configuration.
    #[error("Setup cancelled, the existing configuration was kept")]
    Aborted,

    /// Reading an answer failed.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// Credentials were refused too many times.
    #[error("Too many failed {channel} attempts ({attempts}), try again later")]
    TooManyAttempts {
        /// Channel being configured
        channel: Channel,
        /// Attempts made
        attempts: u32,
    },

    /// A test notification failed in a way retrying cannot fix.
    #[error("Test {channel} notification failed: {source}")]
    Send {
        /// Channel being configured
        channel: Channel,
        /// Underlying send error
        #[source]
        source: SendError,
    },

    /// A supplied value is invalid or the config file cannot be written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A credential could not be stored.
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// The scheduled check could not be registered.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// What the wizard produced.
#[derive(Debug, Clone)]
pub struct SetupOutcome {
    /// The configuration written to disk
    pub config: NotificationConfig,
    /// The registered job, if any
    pub job: Option<ScheduledJob>,
}

/// A secret kept in memory until the configuration has been written.
struct PendingSecret {
    service: &'static str,
    account: String,
    secret: String,
}

/// The setup wizard.
///
/// # Type Parameters
///
/// - `P`: Prompter
/// - `M`: Mail sender used for the test mail
/// - `H`: HTTP client for the Pushbullet and IFTTT tests
/// - `S`: Secret store receiving the credentials
/// - `C`: Scheduler registering the periodic check
pub struct Wizard<P, M, H, S, C> {
    paths: AppPaths,
    args: SetupArgs,
    prompter: P,
    mailer: M,
    push: PushbulletSender<H>,
    ifttt: IftttSender<H>,
    secrets: S,
    scheduler: C,
    executable: PathBuf,
}

impl<P, M, H: Clone, S, C> Wizard<P, M, H, S, C> {
    /// Creates a wizard writing into `paths`.
    ///
    /// The scheduled job runs `ip-changed` from `PATH` unless
    /// [`with_executable`](Self::with_executable) says otherwise.
    #[must_use]
    pub fn new(
        paths: AppPaths,
        args: SetupArgs,
        prompter: P,
        mailer: M,
        client: H,
        secrets: S,
        scheduler: C,
    ) -> Self {
        Self {
            paths,
            args,
            prompter,
            mailer,
            push: PushbulletSender::new(client.clone()),
            ifttt: IftttSender::new(client),
            secrets,
            scheduler,
            executable: PathBuf::from(defaults::APP_DIR_NAME),
        }
    }

    /// Sets the binary the scheduled job runs.
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Returns the prompter.
    #[must_use]
    pub const fn prompter(&self) -> &P {
        &self.prompter
    }
}

impl<P, M, H, S, C> Wizard<P, M, H, S, C>
where
    P: Prompter,
    M: MailSender,
    H: HttpClient,
    S: SecretStore,
    C: Scheduler,
{
    /// Runs the whole wizard.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] when the user aborts, input ends, a test
    /// notification cannot be delivered or anything cannot be persisted.
    /// Nothing is written before every channel has been validated.
    pub async fn run(&mut self) -> Result<SetupOutcome, SetupError> {
        self.confirm_reconfigure()?;
        self.prompter
            .say("We are going to walk you through setting up ip-changed!");

        let notification_type = self.notification_type()?;
        let (mail, password) = self.setup_mail().await?;

        let mut config = NotificationConfig {
            notification_type,
            sender: Some(mail.sender.clone()),
            receivers: Some(mail.receivers.join(", ")),
            smtp_server: Some(mail.smtp_server.clone()),
            port: Some(mail.port),
            ..NotificationConfig::default()
        };
        let mut pending = vec![PendingSecret {
            service: MAIL_SERVICE,
            account: mail.sender,
            secret: password,
        }];

        match notification_type {
            NotificationType::None => {}
            NotificationType::Pushbullet => pending.push(PendingSecret {
                service: PUSHBULLET_SERVICE,
                account: PUSHBULLET_ACCOUNT.to_string(),
                secret: self.setup_pushbullet().await?,
            }),
            NotificationType::Ifttt => {
                let (event, key) = self.setup_ifttt().await?;
                config.ifttt_event = Some(event.clone());
                pending.push(PendingSecret {
                    service: IFTTT_SERVICE,
                    account: event,
                    secret: key,
                });
            }
        }

        config.house_address = Some(self.location(notification_type)?);
        self.persist(&config, &pending)?;

        let job = self.schedule()?;
        Ok(SetupOutcome { config, job })
    }

    fn confirm_reconfigure(&mut self) -> Result<(), SetupError> {
        let path = self.paths.config_file();
        if self.args.reconfigure || !NotificationConfig::exists(&path) {
            return Ok(());
        }

        let question = format!(
            "Configuration file '{}' already exists. Would you like to reconfigure?",
            path.display()
        );
        if confirm(&mut self.prompter, &question)? {
            Ok(())
        } else {
            Err(SetupError::Aborted)
        }
    }

    fn notification_type(&mut self) -> Result<NotificationType, SetupError> {
        if let Some(kind) = self.args.notification_type {
            return Ok(kind);
        }

        let answer = choose(
            &mut self.prompter,
            "- Besides mail, would you like to be notified through Pushbullet or IFTTT? \
             ('', 'none', 'pushbullet', 'ifttt'): ",
            &["", "none", "pushbullet", "ifttt"],
        )?;
        Ok(answer.parse()?)
    }

    fn sender(&mut self) -> Result<String, SetupError> {
        if let Some(sender) = &self.args.sender {
            return Ok(address::parse_address(sender)?);
        }

        Ok(ask_until(
            &mut self.prompter,
            "- Mail address to send the notification from: ",
            "That is not a valid mail address, try again.",
            |answer| address::parse_address(answer).ok(),
        )?)
    }

    fn receivers(&mut self) -> Result<Vec<String>, SetupError> {
        if let Some(receivers) = &self.args.receivers {
            return Ok(address::parse_list(receivers)?);
        }

        Ok(ask_until(
            &mut self.prompter,
            "- Mail addresses (separated by a comma) to send the notification to: ",
            "At least one address is not valid, try again.",
            |answer| address::parse_list(answer).ok(),
        )?)
    }

    fn smtp_server(&mut self, sender: &str) -> Result<(String, u16), SetupError> {
        if let Some(server) = &self.args.smtp_server {
            let port = self.args.smtp_port.unwrap_or(defaults::SMTP_PORT);
            return Ok((server.clone(), port));
        }

        if let Some(server) = known_smtp_server(sender) {
            self.prompter
                .say(&format!("Using {server}:{} for this address.", defaults::SMTP_PORT));
            return Ok((server.to_string(), defaults::SMTP_PORT));
        }

        let server = ask_non_empty(
            &mut self.prompter,
            "- SMTP server of your mail provider (you can look it up online): ",
        )?;
        let port = match self.args.smtp_port {
            Some(port) => port,
            None => ask_until(
                &mut self.prompter,
                "- Port number of the SMTP server (implicit TLS, usually 465): ",
                "The port must be a number between 1 and 65535.",
                |answer| answer.parse::<u16>().ok().filter(|p| *p != 0),
            )?,
        };
        Ok((server, port))
    }

    fn mail_password(&mut self) -> Result<String, SetupError> {
        Ok(self
            .prompter
            .ask_secret("- Type in the password of the sender account: ")?)
    }

    async fn setup_mail(&mut self) -> Result<(MailSettings, String), SetupError> {
        let sender = self.sender()?;
        let interactive = self.args.mail_password.is_none();
        let mut password = match self.args.mail_password.clone() {
            Some(password) => password,
            None => self.mail_password()?,
        };
        let receivers = self.receivers()?;
        let (smtp_server, port) = self.smtp_server(&sender)?;

        let settings = MailSettings {
            sender,
            receivers,
            smtp_server,
            port,
        };
        let note = Note {
            title: TEST_MAIL_SUBJECT.to_string(),
            body: TEST_MAIL_BODY.to_string(),
        };

        for attempt in 1..=defaults::MAX_SETUP_ATTEMPTS {
            match self.mailer.send(&settings, &password, &note).await {
                Ok(()) => {
                    self.prompter
                        .say("Mail has been successfully sent, check your mailbox!");
                    return Ok((settings, password));
                }
                Err(e) if e.is_credential_error() && interactive => {
                    tracing::warn!("Test mail attempt {attempt} failed: {e}");
                    self.prompter.say(&format!(
                        "{e}\nWrong user/password, or the provider requires an app password."
                    ));
                    if attempt < defaults::MAX_SETUP_ATTEMPTS {
                        password = self.mail_password()?;
                    }
                }
                Err(source) => {
                    return Err(SetupError::Send {
                        channel: Channel::Mail,
                        source,
                    });
                }
            }
        }

        Err(SetupError::TooManyAttempts {
            channel: Channel::Mail,
            attempts: defaults::MAX_SETUP_ATTEMPTS,
        })
    }

    async fn setup_pushbullet(&mut self) -> Result<String, SetupError> {
        let note = Note {
            title: TEST_PUSH_TITLE.to_string(),
            body: TEST_PUSH_BODY.to_string(),
        };
        let failed = |source| SetupError::Send {
            channel: Channel::Pushbullet,
            source,
        };

        if let Some(key) = self.args.notification_key.clone() {
            self.push.send(&key, &note).await.map_err(failed)?;
            return Ok(key);
        }

        for attempt in 1..=defaults::MAX_SETUP_ATTEMPTS {
            let key = self
                .prompter
                .ask_secret("- Input your Pushbullet access token: ")?;
            self.prompter
                .say("Trying to send a notification through Pushbullet!");

            match self.push.send(&key, &note).await {
                Ok(()) => {
                    self.prompter
                        .say("Notification has been successfully sent, check your phone!");
                    return Ok(key);
                }
                Err(e) if e.is_credential_error() => {
                    tracing::warn!("Pushbullet test attempt {attempt} failed: {e}");
                    self.prompter.say("Key is not valid, try again!");
                }
                Err(source) => return Err(failed(source)),
            }
        }

        Err(SetupError::TooManyAttempts {
            channel: Channel::Pushbullet,
            attempts: defaults::MAX_SETUP_ATTEMPTS,
        })
    }

    async fn setup_ifttt(&mut self) -> Result<(String, String), SetupError> {
        if let (Some(event), Some(key)) = (&self.args.ifttt_event, &self.args.notification_key) {
            tracing::info!("Storing IFTTT event '{event}' without a test trigger");
            return Ok((event.clone(), key.clone()));
        }

        for attempt in 1..=defaults::MAX_SETUP_ATTEMPTS {
            let event = match &self.args.ifttt_event {
                Some(event) => event.clone(),
                None => ask_non_empty(&mut self.prompter, "- Input your IFTTT event name: ")?,
            };
            let key = match &self.args.notification_key {
                Some(key) => key.clone(),
                None => self.prompter.ask_secret("- Input your IFTTT API key: ")?,
            };

            self.prompter
                .say("Trying to send a notification through IFTTT!");
            match self.ifttt.send(&event, &key, TEST_IFTTT_VALUE).await {
                Ok(()) => {
                    if confirm(&mut self.prompter, "Did you get the notification?")? {
                        return Ok((event, key));
                    }
                }
                Err(SendError::Rejected(reason)) => {
                    self.prompter
                        .say(&format!("IFTTT rejected the trigger: {reason}"));
                }
                Err(source) => {
                    return Err(SetupError::Send {
                        channel: Channel::Ifttt,
                        source,
                    });
                }
            }

            tracing::warn!("IFTTT test attempt {attempt} failed");
            self.prompter
                .say("Check that you followed the IFTTT steps correctly and try again.");
        }

        Err(SetupError::TooManyAttempts {
            channel: Channel::Ifttt,
            attempts: defaults::MAX_SETUP_ATTEMPTS,
        })
    }

    fn location(&mut self, notification_type: NotificationType) -> Result<String, SetupError> {
        if let Some(location) = self.args.location.as_deref().map(str::trim) {
            if !location.is_empty() {
                return Ok(location.to_string());
            }
        }

        let medium = match notification_type {
            NotificationType::None => "mail",
            NotificationType::Pushbullet => "mail and Pushbullet note",
            NotificationType::Ifttt => "mail and IFTTT notification",
        };
        Ok(ask_non_empty(
            &mut self.prompter,
            &format!(
                "- Describe where this machine runs (used in the {medium} to tell you \
                 where the IP changed): "
            ),
        )?)
    }

    fn persist(
        &mut self,
        config: &NotificationConfig,
        pending: &[PendingSecret],
    ) -> Result<(), SetupError> {
        let path = self.paths.config_file();
        config.save(&path)?;
        tracing::info!("Wrote configuration to {}", path.display());

        for entry in pending {
            self.secrets
                .set(entry.service, &entry.account, &entry.secret)?;
        }

        self.prompter
            .say(&format!("Configuration saved to {}", path.display()));
        Ok(())
    }

    fn schedule(&mut self) -> Result<Option<ScheduledJob>, SetupError> {
        let register = self.args.crontab
            || confirm(
                &mut self.prompter,
                "- Would you like to run the check automatically (at boot or at given minute intervals)?",
            )?;
        if !register {
            self.prompter
                .say("Run 'ip-changed check' whenever you want to look for a change.");
            return Ok(None);
        }

        let minutes = match self.args.interval {
            Some(minutes) => minutes,
            None if self.args.crontab => defaults::CHECK_INTERVAL_MINUTES,
            None => ask_until(
                &mut self.prompter,
                "- Provide the minute interval (0 runs once at boot): ",
                "Use 0, 1-59 or a multiple of 60 up to 1440.",
                |answer| {
                    answer
                        .parse::<u32>()
                        .ok()
                        .filter(|m| cron_schedule(*m).is_ok())
                },
            )?,
        };

        let job = ScheduledJob::new(&self.executable, &self.paths, minutes)?;
        self.scheduler.install(&job)?;
        self.prompter
            .say(&format!("Scheduled check registered ({}).", job.schedule()));
        Ok(Some(job))
    }
}

/// Returns the SMTP server for senders of well-known providers.
fn known_smtp_server(sender: &str) -> Option<&'static str> {
    let domain = sender.rsplit_once('@')?.1.to_lowercase();
    KNOWN_PROVIDERS
        .iter()
        .find(|(needle, _)| domain.contains(needle))
        .map(|(_, server)| *server)
}
