//! Public IP echo services and how to read their answers.

use thiserror::Error;

use crate::http::{HttpError, HttpResponse};

/// How the IP is read out of a source's response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// The whole body is the address (surrounding whitespace trimmed).
    PlainText,
    /// The body is a JSON object and the address is the named string field.
    JsonField(&'static str),
}

/// A public endpoint able to report the caller's public IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpSource {
    /// Short name used in logs.
    pub name: &'static str,
    /// Endpoint queried with a plain GET.
    pub url: &'static str,
    /// Rule for reading the address from the response.
    pub extractor: Extractor,
}

/// The built-in sources, in the order they are tried.
pub const DEFAULT_SOURCES: [IpSource; 3] = [
    IpSource {
        name: "icanhazip",
        url: "http://ipv4.icanhazip.com/",
        extractor: Extractor::PlainText,
    },
    IpSource {
        name: "ipinfo",
        url: "http://ipinfo.io/json",
        extractor: Extractor::JsonField("ip"),
    },
    IpSource {
        name: "ip-api",
        url: "http://ip-api.com/json",
        extractor: Extractor::JsonField("query"),
    },
];

/// Why a single source could not produce an address.
///
/// Never fatal on its own; the resolver logs it and moves on.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source URL does not parse.
    #[error("Invalid source URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// The request itself failed (network, timeout).
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The service answered with a non-2xx status.
    #[error("Unexpected HTTP status {0}")]
    Status(http::StatusCode),

    /// The body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The body was well formed but carried no address.
    #[error("Empty address in response")]
    Empty,
}

impl Extractor {
    /// Reads the address from `response` according to this rule.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] for non-2xx responses, non-UTF-8 or non-JSON
    /// bodies, missing fields and empty addresses.
    pub fn extract(self, response: &HttpResponse) -> Result<String, SourceError> {
        if !response.is_success() {
            return Err(SourceError::Status(response.status));
        }

        let raw = match self {
            Self::PlainText => response
                .body_text()
                .ok_or_else(|| SourceError::Malformed("body is not valid UTF-8".to_string()))?
                .to_string(),
            Self::JsonField(field) => {
                let value: serde_json::Value = serde_json::from_slice(&response.body)
                    .map_err(|e| SourceError::Malformed(e.to_string()))?;
                value
                    .get(field)
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| SourceError::Malformed(format!("missing string field '{field}'")))?
                    .to_string()
            }
        };

        let ip = raw.trim();
        if ip.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(ip.to_string())
    }
}
