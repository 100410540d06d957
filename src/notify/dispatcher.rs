//! Fans an IP change out to the configured channels.

use std::path::{Path, PathBuf};

use crate::config::{ExtraChannel, MailSettings, NotificationConfig, ValidatedConfig};
use crate::http::HttpClient;
use crate::secret::{
    IFTTT_SERVICE, MAIL_SERVICE, PUSHBULLET_ACCOUNT, PUSHBULLET_SERVICE, SecretStore,
};

use super::message::{self, IpChange};
use super::{
    Channel, ChannelFailure, IftttSender, MailSender, Notifier, NotifyError, PushbulletSender,
    SendError,
};

/// Credentials for the extra channel, looked up before anything is sent.
enum ExtraDelivery {
    None,
    Pushbullet { key: String },
    Ifttt { event: String, key: String },
}

/// Everything needed to deliver, resolved up front.
struct Delivery {
    config: ValidatedConfig,
    mail: Option<(MailSettings, String)>,
    extra: ExtraDelivery,
}

/// Reads `config.json` and the secret store on every change and sends
/// mail followed by the selected extra channel.
///
/// # Type Parameters
///
/// - `H`: HTTP client shared by the Pushbullet and IFTTT senders
/// - `M`: Mail sender
/// - `S`: Secret store
#[derive(Debug)]
pub struct Dispatcher<H, M, S> {
    config_path: PathBuf,
    mailer: M,
    secrets: S,
    push: PushbulletSender<H>,
    ifttt: IftttSender<H>,
}

impl<H: Clone, M, S> Dispatcher<H, M, S> {
    /// Creates a dispatcher reading its configuration from `config_path`.
    #[must_use]
    pub fn new(config_path: impl Into<PathBuf>, client: H, mailer: M, secrets: S) -> Self {
        Self {
            config_path: config_path.into(),
            mailer,
            secrets,
            push: PushbulletSender::new(client.clone()),
            ifttt: IftttSender::new(client),
        }
    }
}

impl<H, M, S> Dispatcher<H, M, S> {
    /// Returns the configuration file this dispatcher reads.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl<H: HttpClient, M: MailSender, S: SecretStore> Dispatcher<H, M, S> {
    fn secret(&self, service: &'static str, account: &str) -> Result<String, NotifyError> {
        self.secrets
            .get(service, account)?
            .ok_or_else(|| NotifyError::MissingCredential {
                service,
                account: account.to_string(),
            })
    }

    /// Loads and validates the configuration and fetches every credential
    /// the enabled channels need.
    fn prepare(&self) -> Result<Delivery, NotifyError> {
        let file = NotificationConfig::load(&self.config_path)?;
        let config = ValidatedConfig::from_file(&file)?;
        tracing::debug!("Loaded {config}");

        let mail = match &config.mail {
            Some(settings) => {
                let password = self.secret(MAIL_SERVICE, &settings.sender)?;
                Some((settings.clone(), password))
            }
            None => None,
        };

        let extra = match &config.extra {
            ExtraChannel::None => ExtraDelivery::None,
            ExtraChannel::Pushbullet => ExtraDelivery::Pushbullet {
                key: self.secret(PUSHBULLET_SERVICE, PUSHBULLET_ACCOUNT)?,
            },
            ExtraChannel::Ifttt { event } => ExtraDelivery::Ifttt {
                event: event.clone(),
                key: self.secret(IFTTT_SERVICE, event)?,
            },
        };

        Ok(Delivery {
            config,
            mail,
            extra,
        })
    }

    async fn send_mail(
        &self,
        config: &ValidatedConfig,
        settings: &MailSettings,
        password: &str,
        change: &IpChange<'_>,
    ) -> Result<(), SendError> {
        let note = message::mail_note(&config.subject_template, &config.body_template, change)?;
        self.mailer.send(settings, password, &note).await
    }

    async fn send_extra(
        &self,
        config: &ValidatedConfig,
        extra: &ExtraDelivery,
        change: &IpChange<'_>,
    ) -> Option<(Channel, Result<(), SendError>)> {
        match extra {
            ExtraDelivery::None => None,
            ExtraDelivery::Pushbullet { key } => {
                tracing::info!("Sending Pushbullet notification");
                let result = match message::push_note(change) {
                    Ok(note) => self.push.send(key, &note).await,
                    Err(e) => Err(e),
                };
                Some((Channel::Pushbullet, result))
            }
            ExtraDelivery::Ifttt { event, key } => {
                tracing::info!("Triggering IFTTT event '{event}'");
                let result = match message::ifttt_value(&config.body_template, change) {
                    Ok(value) => self.ifttt.send(event, key, &value).await,
                    Err(e) => Err(e),
                };
                Some((Channel::Ifttt, result))
            }
        }
    }
}

impl<H: HttpClient, M: MailSender, S: SecretStore> Notifier for Dispatcher<H, M, S> {
    async fn notify(&self, old_ip: &str, new_ip: &str) -> Result<(), NotifyError> {
        let Delivery {
            config,
            mail,
            extra,
        } = self.prepare()?;

        let change = IpChange {
            old_ip,
            new_ip,
            location: &config.location,
        };
        let mut failures = Vec::new();

        if let Some((settings, password)) = &mail {
            tracing::info!("Sending mail to {}", settings.receivers.join(", "));
            if let Err(error) = self.send_mail(&config, settings, password, &change).await {
                tracing::error!("Mail notification failed: {error}");
                failures.push(ChannelFailure {
                    channel: Channel::Mail,
                    error,
                });
            }
        }

        if let Some((channel, Err(error))) = self.send_extra(&config, &extra, &change).await {
            tracing::error!("{channel} notification failed: {error}");
            failures.push(ChannelFailure { channel, error });
        }

        if mail.is_none() && matches!(extra, ExtraDelivery::None) {
            tracing::warn!("Mail is disabled and no other channel is configured, nothing sent");
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(NotifyError::DeliveryFailed { failures })
        }
    }
}
