//! Notification delivery.
//!
//! This module provides:
//! - The [`Notifier`] abstraction used by the check pipeline
//! - The configuration-driven [`Dispatcher`]
//! - One sender per channel ([`SmtpMailer`], [`PushbulletSender`],
//!   [`IftttSender`])
//! - Message rendering ([`message`])
//!
//! # Delivery order
//!
//! Mail goes first (unless disabled), then the extra channel selected by
//! `notification_type`. A failing channel does not stop the next one; all
//! failures are reported together as [`NotifyError::DeliveryFailed`].

mod dispatcher;
mod error;
mod ifttt;
mod mail;
pub mod message;
mod push;

#[cfg(test)]
mod dispatcher_tests;

pub use dispatcher::Dispatcher;
pub use error::{Channel, ChannelFailure, NotifyError, SendError};
pub use ifttt::{IFTTT_TRIGGER_BASE, IftttSender, trigger_url};
pub use mail::{MailSender, SmtpMailer, build_message};
pub use message::{IpChange, Note};
pub use push::{PUSHBULLET_URL, PushbulletSender};

/// Trait for reporting an IP change.
///
/// Implemented by [`Dispatcher`]; the check pipeline only depends on this
/// trait so it can be tested without configuration or network.
pub trait Notifier: Send + Sync {
    /// Reports that the public IP changed from `old_ip` to `new_ip`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] for configuration, credential or delivery
    /// failures.
    fn notify(
        &self,
        old_ip: &str,
        new_ip: &str,
    ) -> impl std::future::Future<Output = Result<(), NotifyError>> + Send;
}
