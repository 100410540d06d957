//! IFTTT Maker webhook triggers.

use std::time::Duration;

use serde::Serialize;

use crate::config::defaults;
use crate::http::{HttpClient, HttpRequest};

use super::SendError;

/// Base of the Maker trigger URL; event and key are appended.
pub const IFTTT_TRIGGER_BASE: &str = "https://maker.ifttt.com/trigger/";

#[derive(Serialize)]
struct TriggerBody<'a> {
    value1: &'a str,
}

/// Triggers IFTTT Maker events.
///
/// IFTTT gives no feedback about the key: an unknown key and an unknown
/// event both come back as plain rejections.
#[derive(Debug, Clone)]
pub struct IftttSender<H> {
    client: H,
    timeout: Duration,
}

impl<H> IftttSender<H> {
    /// Creates a sender with the default request timeout.
    #[must_use]
    pub fn new(client: H) -> Self {
        Self {
            client,
            timeout: defaults::send_timeout(),
        }
    }
}

impl<H: HttpClient> IftttSender<H> {
    /// Triggers `event` with `value` as `value1`.
    ///
    /// # Errors
    ///
    /// - [`SendError::InvalidMessage`] when event or key do not form a URL
    /// - [`SendError::Connectivity`] when IFTTT cannot be reached
    /// - [`SendError::Rejected`] for any non-2xx answer
    pub async fn send(&self, event: &str, key: &str, value: &str) -> Result<(), SendError> {
        let url = trigger_url(event, key)?;
        let request = HttpRequest::post(url)
            .with_timeout(self.timeout)
            .with_json(&TriggerBody { value1: value })
            .map_err(|e| SendError::InvalidMessage(e.to_string()))?;

        let response = self.client.request(request).await?;
        if response.is_success() {
            return Ok(());
        }

        Err(SendError::Rejected(format!(
            "HTTP {}: {}",
            response.status,
            response.body_text().unwrap_or_default()
        )))
    }
}

/// Builds `https://maker.ifttt.com/trigger/<event>/with/key/<key>`.
///
/// Event and key are percent-encoded as single path segments.
///
/// # Errors
///
/// Returns [`SendError::InvalidMessage`] if the result is not a valid URL.
pub fn trigger_url(event: &str, key: &str) -> Result<url::Url, SendError> {
    let mut url =
        url::Url::parse(IFTTT_TRIGGER_BASE).map_err(|e| SendError::InvalidMessage(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| SendError::InvalidMessage("trigger URL cannot have a path".to_string()))?
        .pop_if_empty()
        .extend([event, "with", "key", key]);
    Ok(url)
}
