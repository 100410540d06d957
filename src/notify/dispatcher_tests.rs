//! Tests for the notification dispatcher.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::config::{NotificationConfig, NotificationType};
use crate::http::mock::{MockClient, Reply};
use crate::notify::mock::MockMailer;
use crate::notify::{Channel, Dispatcher, Notifier, NotifyError, SendError};
use crate::secret::mock::MemorySecretStore;
use crate::secret::{IFTTT_SERVICE, MAIL_SERVICE, PUSHBULLET_ACCOUNT, PUSHBULLET_SERVICE};

const SENDER: &str = "sender@example.com";

struct Fixture {
    _dir: TempDir,
    config_path: PathBuf,
    client: Arc<MockClient>,
    mailer: Arc<MockMailer>,
}

type TestDispatcher = Dispatcher<Arc<MockClient>, Arc<MockMailer>, MemorySecretStore>;

impl Fixture {
    fn new(config: &NotificationConfig) -> Self {
        Self::with(config, MockClient::new(), MockMailer::new())
    }

    fn with(config: &NotificationConfig, client: MockClient, mailer: MockMailer) -> Self {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        config.save(&config_path).unwrap();

        Self {
            _dir: dir,
            config_path,
            client: Arc::new(client),
            mailer: Arc::new(mailer),
        }
    }

    fn dispatcher(&self, secrets: MemorySecretStore) -> TestDispatcher {
        Dispatcher::new(
            &self.config_path,
            Arc::clone(&self.client),
            Arc::clone(&self.mailer),
            secrets,
        )
    }
}

fn config(notification_type: NotificationType) -> NotificationConfig {
    NotificationConfig {
        notification_type,
        sender: Some(SENDER.to_string()),
        receivers: Some("a@example.com, b@example.com".to_string()),
        smtp_server: Some("smtp.example.com".to_string()),
        port: Some(465),
        house_address: Some("home".to_string()),
        ifttt_event: (notification_type == NotificationType::Ifttt)
            .then(|| "ip_changed".to_string()),
        ..NotificationConfig::default()
    }
}

fn all_secrets() -> MemorySecretStore {
    MemorySecretStore::new()
        .with(MAIL_SERVICE, SENDER, "mail-pass")
        .with(PUSHBULLET_SERVICE, PUSHBULLET_ACCOUNT, "push-key")
        .with(IFTTT_SERVICE, "ip_changed", "ifttt-key")
}

fn request_json(client: &MockClient, index: usize) -> serde_json::Value {
    let requests = client.requests();
    serde_json::from_slice(requests[index].body.as_deref().unwrap()).unwrap()
}

mod channels {
    use super::*;

    #[tokio::test]
    async fn pushbullet_sends_mail_then_push_with_both_addresses() {
        let fx = Fixture::new(&config(NotificationType::Pushbullet));

        fx.dispatcher(all_secrets())
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap();

        let mails = fx.mailer.sent();
        assert_eq!(mails.len(), 1);
        assert!(mails[0].note.body.contains("1.2.3.4"));
        assert!(mails[0].note.body.contains("5.6.7.8"));
        assert_eq!(mails[0].password, "mail-pass");
        assert_eq!(mails[0].settings.receivers, ["a@example.com", "b@example.com"]);

        let requests = fx.client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].headers["access-token"], "push-key");
        let push = request_json(&fx.client, 0);
        let text = format!("{} {}", push["title"], push["body"]);
        assert!(text.contains("1.2.3.4"));
        assert!(text.contains("5.6.7.8"));
    }

    #[tokio::test]
    async fn none_sends_mail_only() {
        let fx = Fixture::new(&config(NotificationType::None));

        fx.dispatcher(all_secrets())
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap();

        assert_eq!(fx.mailer.sent().len(), 1);
        assert!(fx.client.requests().is_empty());
    }

    #[tokio::test]
    async fn ifttt_triggers_event_with_location() {
        let fx = Fixture::new(&config(NotificationType::Ifttt));

        fx.dispatcher(all_secrets())
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap();

        assert_eq!(fx.mailer.sent().len(), 1);
        let requests = fx.client.requests();
        assert_eq!(
            requests[0].url.as_str(),
            "https://maker.ifttt.com/trigger/ip_changed/with/key/ifttt-key"
        );
        assert_eq!(
            request_json(&fx.client, 0)["value1"],
            "IP has changed from 1.2.3.4 to 5.6.7.8 at home"
        );
    }

    #[tokio::test]
    async fn mail_disabled_skips_mail_and_its_password() {
        let mut cfg = config(NotificationType::Pushbullet);
        cfg.mail_enabled = false;
        let fx = Fixture::new(&cfg);
        let secrets =
            MemorySecretStore::new().with(PUSHBULLET_SERVICE, PUSHBULLET_ACCOUNT, "push-key");

        fx.dispatcher(secrets)
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap();

        assert!(fx.mailer.sent().is_empty());
        assert_eq!(fx.client.requests().len(), 1);
    }

    #[tokio::test]
    async fn subject_template_override_is_used() {
        let mut cfg = config(NotificationType::None);
        cfg.subject_template = Some("[{{location}}] now {{new_ip}}".to_string());
        let fx = Fixture::new(&cfg);

        fx.dispatcher(all_secrets())
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap();

        assert_eq!(fx.mailer.sent()[0].note.title, "[home] now 5.6.7.8");
    }
}

mod configuration {
    use super::*;

    #[tokio::test]
    async fn missing_config_file() {
        let dir = TempDir::new().unwrap();
        let mailer = Arc::new(MockMailer::new());
        let dispatcher = Dispatcher::new(
            dir.path().join("config.json"),
            Arc::new(MockClient::new()),
            Arc::clone(&mailer),
            all_secrets(),
        );

        let err = dispatcher.notify("1.2.3.4", "5.6.7.8").await.unwrap_err();

        assert!(matches!(err, NotifyError::MissingConfig { .. }));
        assert!(err.is_config_error());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_mail_password_sends_nothing() {
        let fx = Fixture::new(&config(NotificationType::Pushbullet));
        let secrets =
            MemorySecretStore::new().with(PUSHBULLET_SERVICE, PUSHBULLET_ACCOUNT, "push-key");

        let err = fx
            .dispatcher(secrets)
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap_err();

        match err {
            NotifyError::MissingCredential { service, account } => {
                assert_eq!(service, MAIL_SERVICE);
                assert_eq!(account, SENDER);
            }
            other => panic!("Expected MissingCredential, got {other:?}"),
        }
        assert!(fx.mailer.sent().is_empty());
        assert!(fx.client.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_push_key_sends_nothing() {
        let fx = Fixture::new(&config(NotificationType::Pushbullet));
        let secrets = MemorySecretStore::new().with(MAIL_SERVICE, SENDER, "mail-pass");

        let err = fx
            .dispatcher(secrets)
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NotifyError::MissingCredential { service: PUSHBULLET_SERVICE, .. }
        ));
        assert!(fx.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn ifttt_without_event_is_config_error() {
        let mut cfg = config(NotificationType::Ifttt);
        cfg.ifttt_event = None;
        let fx = Fixture::new(&cfg);

        let err = fx
            .dispatcher(all_secrets())
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Config(_)));
        assert!(fx.mailer.sent().is_empty());
    }
}

mod delivery {
    use super::*;

    #[tokio::test]
    async fn mail_failure_does_not_stop_push() {
        let fx = Fixture::with(
            &config(NotificationType::Pushbullet),
            MockClient::new(),
            MockMailer::new().then(Err(SendError::Connectivity("refused".to_string()))),
        );

        let err = fx
            .dispatcher(all_secrets())
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap_err();

        assert_eq!(fx.client.requests().len(), 1);
        match err {
            NotifyError::DeliveryFailed { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].channel, Channel::Mail);
            }
            other => panic!("Expected DeliveryFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn every_failure_is_reported() {
        let fx = Fixture::with(
            &config(NotificationType::Pushbullet),
            MockClient::new().then(Reply::Status(http::StatusCode::UNAUTHORIZED, "")),
            MockMailer::new().then(Err(SendError::Authentication("535".to_string()))),
        );

        let err = fx
            .dispatcher(all_secrets())
            .notify("1.2.3.4", "5.6.7.8")
            .await
            .unwrap_err();

        assert!(!err.is_config_error());
        let NotifyError::DeliveryFailed { failures } = err else {
            panic!("Expected DeliveryFailed");
        };
        let channels: Vec<_> = failures.iter().map(|f| f.channel).collect();
        assert_eq!(channels, [Channel::Mail, Channel::Pushbullet]);
        assert!(matches!(failures[1].error, SendError::InvalidKey(_)));
    }
}
