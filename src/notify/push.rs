//! Pushbullet notes.

use std::time::Duration;

use serde::Serialize;

use crate::config::defaults;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

use super::{Note, SendError};

/// Pushbullet push creation endpoint.
pub const PUSHBULLET_URL: &str = "https://api.pushbullet.com/v2/pushes";

#[derive(Serialize)]
struct PushBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'a str,
    body: &'a str,
}

/// Sends notes through the Pushbullet API.
#[derive(Debug, Clone)]
pub struct PushbulletSender<H> {
    client: H,
    timeout: Duration,
}

impl<H> PushbulletSender<H> {
    /// Creates a sender with the default request timeout.
    #[must_use]
    pub fn new(client: H) -> Self {
        Self {
            client,
            timeout: defaults::send_timeout(),
        }
    }
}

impl<H: HttpClient> PushbulletSender<H> {
    /// Pushes `note` to every device of the account owning `key`.
    ///
    /// # Errors
    ///
    /// - [`SendError::InvalidKey`] when Pushbullet answers 401 or 403
    /// - [`SendError::Connectivity`] when the API cannot be reached
    /// - [`SendError::Rejected`] for any other non-2xx answer
    pub async fn send(&self, key: &str, note: &Note) -> Result<(), SendError> {
        let request = build_request(key, note, self.timeout)?;
        let response = self.client.request(request).await?;
        check_response(&response)
    }
}

fn build_request(key: &str, note: &Note, timeout: Duration) -> Result<HttpRequest, SendError> {
    let url = url::Url::parse(PUSHBULLET_URL).map_err(|e| SendError::InvalidMessage(e.to_string()))?;
    let token = http::HeaderValue::from_str(key)
        .map_err(|_| SendError::InvalidMessage("access token contains invalid characters".to_string()))?;

    let body = PushBody {
        kind: "note",
        title: &note.title,
        body: &note.body,
    };

    HttpRequest::post(url)
        .with_header(http::HeaderName::from_static("access-token"), token)
        .with_timeout(timeout)
        .with_json(&body)
        .map_err(|e| SendError::InvalidMessage(e.to_string()))
}

fn check_response(response: &HttpResponse) -> Result<(), SendError> {
    let status = response.status;
    if status.is_success() {
        return Ok(());
    }

    if status == http::StatusCode::UNAUTHORIZED || status == http::StatusCode::FORBIDDEN {
        return Err(SendError::InvalidKey(status));
    }

    Err(SendError::Rejected(format!(
        "HTTP {status}: {}",
        response.body_text().unwrap_or_default()
    )))
}
