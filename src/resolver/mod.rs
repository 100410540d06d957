//! Public IP resolution with ordered fallback.
//!
//! [`IpResolver`] walks a table of [`IpSource`]s and returns the first
//! address any of them reports. A source failing is not an error on its
//! own; only the exhaustion of the whole table is.

mod source;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use source::{DEFAULT_SOURCES, Extractor, IpSource, SourceError};

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::defaults;
use crate::http::{HttpClient, HttpRequest};

/// Every source failed.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No source produced an address within the timeout.
    #[error(
        "No IP source available, add more sources or increase the timeout \
         (sources = {sources}, timeout = {}s)",
        timeout.as_secs()
    )]
    NoSourceAvailable {
        /// Number of sources tried
        sources: usize,
        /// Timeout applied to each attempt
        timeout: Duration,
    },
}

/// Resolves the machine's public IP through a list of sources.
#[derive(Debug)]
pub struct IpResolver<H> {
    client: H,
    sources: Vec<IpSource>,
    timeout: Duration,
}

impl<H> IpResolver<H> {
    /// Creates a resolver over [`DEFAULT_SOURCES`] with the default
    /// per-attempt timeout.
    #[must_use]
    pub fn new(client: H) -> Self {
        Self {
            client,
            sources: DEFAULT_SOURCES.to_vec(),
            timeout: defaults::source_timeout(),
        }
    }

    /// Replaces the source table.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<IpSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Sets the timeout applied to each source attempt.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured sources in try order.
    #[must_use]
    pub fn sources(&self) -> &[IpSource] {
        &self.sources
    }
}

impl<H: HttpClient> IpResolver<H> {
    /// Returns the first address reported by any source.
    ///
    /// Sources are tried in order; the first success ends the scan.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoSourceAvailable`] when every source fails.
    pub async fn resolve(&self) -> Result<String, ResolveError> {
        for source in &self.sources {
            tracing::info!("Requesting current IP with '{}'", source.name);
            let started = Instant::now();

            match self.query(source).await {
                Ok(ip) => {
                    tracing::info!(
                        "Request to '{}' took {} seconds",
                        source.name,
                        started.elapsed().as_secs()
                    );
                    return Ok(ip);
                }
                Err(e) => {
                    tracing::warn!("Requesting IP using '{}' failed: {e}", source.name);
                }
            }
        }

        Err(ResolveError::NoSourceAvailable {
            sources: self.sources.len(),
            timeout: self.timeout,
        })
    }

    async fn query(&self, source: &IpSource) -> Result<String, SourceError> {
        let url = url::Url::parse(source.url).map_err(|e| SourceError::InvalidUrl {
            url: source.url.to_string(),
            reason: e.to_string(),
        })?;

        let request = HttpRequest::get(url).with_timeout(self.timeout);
        let response = self.client.request(request).await?;
        source.extractor.extract(&response)
    }
}
