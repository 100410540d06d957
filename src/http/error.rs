//! Error types for HTTP operations.

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong at the transport level. Non-2xx responses are
/// not errors here; callers inspect [`HttpResponse::status`] themselves.
///
/// [`HttpResponse::status`]: super::HttpResponse::status
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// TLS handshake failures and broken bodies.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built (bad URL, bad header, ...).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
