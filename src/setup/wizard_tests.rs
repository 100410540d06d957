//! Tests for the setup wizard.

use std::sync::Arc;

use tempfile::TempDir;

use super::*;
use crate::http::mock::{MockClient, Reply};
use crate::notify::mock::MockMailer;
use crate::secret::mock::MemorySecretStore;

type TestWizard = Wizard<
    ScriptedPrompter,
    Arc<MockMailer>,
    Arc<MockClient>,
    Arc<MemorySecretStore>,
    Arc<MockScheduler>,
>;

struct Fixture {
    dir: TempDir,
    mailer: Arc<MockMailer>,
    client: Arc<MockClient>,
    secrets: Arc<MemorySecretStore>,
    scheduler: Arc<MockScheduler>,
}

impl Fixture {
    fn new() -> Self {
        Self::with(MockMailer::new(), MockClient::new())
    }

    fn with(mailer: MockMailer, client: MockClient) -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            mailer: Arc::new(mailer),
            client: Arc::new(client),
            secrets: Arc::new(MemorySecretStore::new()),
            scheduler: Arc::new(MockScheduler::default()),
        }
    }

    fn paths(&self) -> AppPaths {
        AppPaths::new(self.dir.path())
    }

    fn wizard(&self, args: SetupArgs, answers: &[&str]) -> TestWizard {
        Wizard::new(
            self.paths(),
            args,
            ScriptedPrompter::new(answers),
            Arc::clone(&self.mailer),
            Arc::clone(&self.client),
            Arc::clone(&self.secrets),
            Arc::clone(&self.scheduler),
        )
        .with_executable("/usr/local/bin/ip-changed")
    }

    fn saved_config(&self) -> NotificationConfig {
        NotificationConfig::load(&self.paths().config_file()).unwrap()
    }

    fn config_written(&self) -> bool {
        NotificationConfig::exists(&self.paths().config_file())
    }
}

fn auth_error() -> SendError {
    SendError::Authentication("535 5.7.8 Username and Password not accepted".to_string())
}

mod mail {
    use super::*;

    #[tokio::test]
    async fn gmail_sender_uses_preset_server() {
        let fx = Fixture::new();
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &["", "me@gmail.com", "pw", "a@example.com,b@example.com", "Home", "n"],
        );

        let outcome = wizard.run().await.unwrap();

        assert!(wizard.prompter().finished());
        assert!(outcome.job.is_none());
        let config = fx.saved_config();
        assert_eq!(config, outcome.config);
        assert_eq!(config.notification_type, NotificationType::None);
        assert_eq!(config.sender.as_deref(), Some("me@gmail.com"));
        assert_eq!(config.receivers.as_deref(), Some("a@example.com, b@example.com"));
        assert_eq!(config.smtp_server.as_deref(), Some("smtp.gmail.com"));
        assert_eq!(config.port, Some(465));
        assert_eq!(config.house_address.as_deref(), Some("Home"));
        assert!(config.mail_enabled);

        assert_eq!(fx.secrets.peek(MAIL_SERVICE, "me@gmail.com").as_deref(), Some("pw"));
        let sent = fx.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].note.title, TEST_MAIL_SUBJECT);
        assert!(fx.scheduler.installed().is_empty());
    }

    #[tokio::test]
    async fn invalid_receivers_are_asked_again() {
        let fx = Fixture::new();
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &[
                "",
                "me@yahoo.com",
                "pw",
                "a@example.com, not-an-address",
                "a@example.com",
                "Home",
                "n",
            ],
        );

        wizard.run().await.unwrap();

        let config = fx.saved_config();
        assert_eq!(config.receivers.as_deref(), Some("a@example.com"));
        assert_eq!(config.smtp_server.as_deref(), Some("smtp.mail.yahoo.com"));
        assert!(
            wizard
                .prompter()
                .said
                .iter()
                .any(|line| line.contains("not valid"))
        );
    }

    #[tokio::test]
    async fn invalid_sender_is_asked_again() {
        let fx = Fixture::new();
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &["", "me", "me@gmail.com", "pw", "a@example.com", "Home", "n"],
        );

        wizard.run().await.unwrap();

        assert_eq!(fx.saved_config().sender.as_deref(), Some("me@gmail.com"));
    }

    #[tokio::test]
    async fn unknown_provider_asks_server_and_port() {
        let fx = Fixture::new();
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &[
                "",
                "me@example.com",
                "pw",
                "a@example.com",
                "mail.example.com",
                "smtp",
                "0",
                "2465",
                "Home",
                "n",
            ],
        );

        wizard.run().await.unwrap();

        let config = fx.saved_config();
        assert_eq!(config.smtp_server.as_deref(), Some("mail.example.com"));
        assert_eq!(config.port, Some(2465));
    }

    #[tokio::test]
    async fn wrong_password_is_asked_again() {
        let fx = Fixture::with(MockMailer::new().then(Err(auth_error())), MockClient::new());
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &["", "me@gmail.com", "wrong", "a@example.com", "right", "Home", "n"],
        );

        wizard.run().await.unwrap();

        let passwords: Vec<_> = fx.mailer.sent().into_iter().map(|m| m.password).collect();
        assert_eq!(passwords, ["wrong", "right"]);
        assert_eq!(
            fx.secrets.peek(MAIL_SERVICE, "me@gmail.com").as_deref(),
            Some("right")
        );
    }

    #[tokio::test]
    async fn three_authentication_failures_abort() {
        let fx = Fixture::with(
            MockMailer::new()
                .then(Err(auth_error()))
                .then(Err(auth_error()))
                .then(Err(auth_error())),
            MockClient::new(),
        );
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &["", "me@gmail.com", "pw1", "a@example.com", "pw2", "pw3"],
        );

        let err = wizard.run().await.unwrap_err();

        assert!(matches!(
            err,
            SetupError::TooManyAttempts {
                channel: Channel::Mail,
                attempts: 3
            }
        ));
        assert_eq!(fx.mailer.sent().len(), 3);
        assert!(wizard.prompter().finished());
        assert!(!fx.config_written());
        assert!(fx.secrets.peek(MAIL_SERVICE, "me@gmail.com").is_none());
    }

    #[tokio::test]
    async fn connectivity_failure_aborts_immediately() {
        let fx = Fixture::with(
            MockMailer::new().then(Err(SendError::Connectivity("dns".to_string()))),
            MockClient::new(),
        );
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &["", "me@gmail.com", "pw", "a@example.com"],
        );

        let err = wizard.run().await.unwrap_err();

        assert!(matches!(
            err,
            SetupError::Send {
                channel: Channel::Mail,
                source: SendError::Connectivity(_)
            }
        ));
        assert_eq!(fx.mailer.sent().len(), 1);
        assert!(!fx.config_written());
    }

    #[tokio::test]
    async fn rejected_non_interactive_password_aborts() {
        let fx = Fixture::with(MockMailer::new().then(Err(auth_error())), MockClient::new());
        let args = SetupArgs {
            mail_password: Some("from-env".to_string()),
            ..SetupArgs::default()
        };
        let mut wizard = fx.wizard(args, &["", "me@gmail.com", "a@example.com"]);

        let err = wizard.run().await.unwrap_err();

        assert!(matches!(
            err,
            SetupError::Send {
                source: SendError::Authentication(_),
                ..
            }
        ));
        assert_eq!(fx.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn invalid_sender_flag_is_config_error() {
        let fx = Fixture::new();
        let args = SetupArgs {
            sender: Some("nobody".to_string()),
            ..SetupArgs::default()
        };
        let mut wizard = fx.wizard(args, &[""]);

        let err = wizard.run().await.unwrap_err();

        assert!(matches!(
            err,
            SetupError::Config(ConfigError::InvalidMailAddress { .. })
        ));
    }
}

mod pushbullet {
    use super::*;

    #[tokio::test]
    async fn invalid_key_is_asked_again() {
        let fx = Fixture::with(
            MockMailer::new(),
            MockClient::new().then(Reply::Status(http::StatusCode::UNAUTHORIZED, "")),
        );
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &[
                "pushbullet",
                "me@gmail.com",
                "pw",
                "a@example.com",
                "bad-key",
                "good-key",
                "Home",
                "n",
            ],
        );

        wizard.run().await.unwrap();

        assert_eq!(fx.client.requests().len(), 2);
        assert_eq!(
            fx.secrets
                .peek(PUSHBULLET_SERVICE, PUSHBULLET_ACCOUNT)
                .as_deref(),
            Some("good-key")
        );
        assert_eq!(
            fx.saved_config().notification_type,
            NotificationType::Pushbullet
        );
    }

    #[tokio::test]
    async fn three_invalid_keys_abort() {
        let unauthorized = Reply::Status(http::StatusCode::UNAUTHORIZED, "");
        let fx = Fixture::with(
            MockMailer::new(),
            MockClient::new()
                .then(unauthorized.clone())
                .then(unauthorized.clone())
                .then(unauthorized),
        );
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &["pushbullet", "me@gmail.com", "pw", "a@example.com", "k1", "k2", "k3"],
        );

        let err = wizard.run().await.unwrap_err();

        assert!(matches!(
            err,
            SetupError::TooManyAttempts {
                channel: Channel::Pushbullet,
                attempts: 3
            }
        ));
        assert!(!fx.config_written());
    }

    #[tokio::test]
    async fn connectivity_failure_aborts() {
        let fx = Fixture::with(MockMailer::new(), MockClient::new().then(Reply::Timeout));
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &["pushbullet", "me@gmail.com", "pw", "a@example.com", "key"],
        );

        let err = wizard.run().await.unwrap_err();

        assert!(matches!(
            err,
            SetupError::Send {
                channel: Channel::Pushbullet,
                ..
            }
        ));
    }
}

mod ifttt {
    use super::*;

    #[tokio::test]
    async fn unconfirmed_trigger_counts_as_failed_attempt() {
        let fx = Fixture::new();
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &[
                "ifttt",
                "me@gmail.com",
                "pw",
                "a@example.com",
                "ip_changed",
                "key1",
                "n",
                "ip_changed",
                "key2",
                "y",
                "Home",
                "n",
            ],
        );

        wizard.run().await.unwrap();

        assert_eq!(fx.client.requests().len(), 2);
        assert_eq!(
            fx.secrets.peek(IFTTT_SERVICE, "ip_changed").as_deref(),
            Some("key2")
        );
        assert_eq!(fx.saved_config().ifttt_event.as_deref(), Some("ip_changed"));
    }

    #[tokio::test]
    async fn non_interactive_credentials_are_stored_without_test() {
        let fx = Fixture::new();
        let args = SetupArgs {
            notification_type: Some(NotificationType::Ifttt),
            ifttt_event: Some("ip_changed".to_string()),
            notification_key: Some("k3y".to_string()),
            ..SetupArgs::default()
        };
        let mut wizard = fx.wizard(args, &["me@gmail.com", "pw", "a@example.com", "Home", "n"]);

        wizard.run().await.unwrap();

        assert!(fx.client.requests().is_empty());
        assert_eq!(
            fx.secrets.peek(IFTTT_SERVICE, "ip_changed").as_deref(),
            Some("k3y")
        );
    }
}

mod reconfigure {
    use super::*;

    fn existing(fx: &Fixture) {
        NotificationConfig::default()
            .save(&fx.paths().config_file())
            .unwrap();
    }

    #[tokio::test]
    async fn declining_keeps_existing_config() {
        let fx = Fixture::new();
        existing(&fx);
        let mut wizard = fx.wizard(SetupArgs::default(), &["n"]);

        let err = wizard.run().await.unwrap_err();

        assert!(matches!(err, SetupError::Aborted));
        assert_eq!(fx.saved_config(), NotificationConfig::default());
        assert!(fx.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn flag_skips_question() {
        let fx = Fixture::new();
        existing(&fx);
        let args = SetupArgs {
            reconfigure: true,
            ..SetupArgs::default()
        };
        let mut wizard = fx.wizard(args, &["", "me@gmail.com", "pw", "a@example.com", "Home", "n"]);

        wizard.run().await.unwrap();

        assert_eq!(fx.saved_config().sender.as_deref(), Some("me@gmail.com"));
    }
}

mod schedule {
    use super::*;

    #[tokio::test]
    async fn interactive_interval_is_validated() {
        let fx = Fixture::new();
        let mut wizard = fx.wizard(
            SetupArgs::default(),
            &["", "me@gmail.com", "pw", "a@example.com", "Home", "y", "61", "x", "30"],
        );

        let outcome = wizard.run().await.unwrap();

        let installed = fx.scheduler.installed();
        assert_eq!(installed.len(), 1);
        assert!(installed[0].starts_with("*/30 * * * * /usr/local/bin/ip-changed --config-dir "));
        assert!(installed[0].ends_with(JOB_MARKER));
        assert_eq!(outcome.job.map(|j| j.line()), Some(installed[0].clone()));
    }

    #[tokio::test]
    async fn fully_non_interactive_setup() {
        let fx = Fixture::new();
        let args = SetupArgs {
            notification_type: Some(NotificationType::None),
            sender: Some("me@example.com".to_string()),
            receivers: Some("a@example.com".to_string()),
            smtp_server: Some("smtp.example.com".to_string()),
            smtp_port: Some(2465),
            mail_password: Some("pw".to_string()),
            location: Some("Cabin".to_string()),
            crontab: true,
            ..SetupArgs::default()
        };
        let mut wizard = fx.wizard(args, &[]);

        wizard.run().await.unwrap();

        assert!(wizard.prompter().questions.is_empty());
        let config = fx.saved_config();
        assert_eq!(config.port, Some(2465));
        assert_eq!(config.house_address.as_deref(), Some("Cabin"));
        let installed = fx.scheduler.installed();
        assert!(installed[0].starts_with("0 * * * * "));
    }

    #[tokio::test]
    async fn invalid_interval_flag_fails_after_config_is_written() {
        let fx = Fixture::new();
        let args = SetupArgs {
            interval: Some(90),
            crontab: true,
            ..SetupArgs::default()
        };
        let mut wizard = fx.wizard(args, &["", "me@gmail.com", "pw", "a@example.com", "Home"]);

        let err = wizard.run().await.unwrap_err();

        assert!(matches!(
            err,
            SetupError::Schedule(ScheduleError::InvalidInterval(90))
        ));
        assert!(fx.config_written());
        assert!(fx.scheduler.installed().is_empty());
    }
}

#[test]
fn known_providers_match_sender_domain() {
    assert_eq!(known_smtp_server("me@gmail.com"), Some("smtp.gmail.com"));
    assert_eq!(known_smtp_server("me@YAHOO.co.uk"), Some("smtp.mail.yahoo.com"));
    assert_eq!(known_smtp_server("gmail@example.com"), None);
    assert_eq!(known_smtp_server("nobody"), None);
}
