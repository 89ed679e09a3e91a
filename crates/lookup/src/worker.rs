//! Lookup worker: one identifier, one HTTP round trip, at most one retry.
//!
//! The worker owns the request/retry policy. Every path ends in exactly one
//! [`LookupOutcome`]; errors never escape to the pipeline.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{Client, Response};
use rust_decimal::Decimal;

use crate::errors::{LookupError, PipelineError};
use crate::models::{LookupOutcome, LookupRequest};
use crate::provider::PriceProvider;

/// Default HTTP request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Initial attempt plus one throttling retry.
pub const MAX_ATTEMPTS: u32 = 2;

/// Backoff applied before the throttling retry.
///
/// The wait is `(attempts_made + base_offset) × backoff_unit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_offset: u32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn backoff(&self, attempts_made: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(attempts_made.saturating_add(self.base_offset))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_offset: 10,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// Executes lookups against one provider. Shared by every task in a run.
pub struct LookupWorker {
    client: Client,
    provider: Arc<dyn PriceProvider>,
    retry: RetryPolicy,
}

impl LookupWorker {
    pub fn new(client: Client, provider: Arc<dyn PriceProvider>, retry: RetryPolicy) -> Self {
        Self {
            client,
            provider,
            retry,
        }
    }

    /// Builds the shared client with a per-request timeout.
    pub fn http_client(timeout: Duration) -> Result<Client, PipelineError> {
        Ok(Client::builder().timeout(timeout).build()?)
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Resolves one identifier to its terminal outcome.
    pub async fn lookup(&self, identifier: &str) -> LookupOutcome {
        match self.resolve(identifier).await {
            Ok(price) => {
                debug!("Resolved {} at {}", identifier, price);
                LookupOutcome::Priced {
                    identifier: identifier.to_string(),
                    price,
                }
            }
            Err(e) => {
                warn!("Unable to retrieve price for {}: {}", identifier, e);
                LookupOutcome::failed(identifier.to_string(), &e)
            }
        }
    }

    async fn resolve(&self, identifier: &str) -> Result<Decimal, LookupError> {
        let request = self.provider.build_request(identifier);

        info!("Initial call for: {}", identifier);
        let mut attempts = 1;
        let mut response = self.send(&request).await?;

        while self.provider.is_throttled(response.status()) && attempts < MAX_ATTEMPTS {
            let backoff = self.retry.backoff(attempts);
            debug!(
                "{} throttled {}, retrying in {:?}",
                self.provider.id(),
                identifier,
                backoff
            );
            tokio::time::sleep(backoff).await;
            attempts += 1;

            info!("Retry call for: {}", identifier);
            response = self.send(&request).await?;
        }

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if self.provider.is_throttled(status) {
            let status = self
                .provider
                .parse_response(status, &body)
                .map(|parsed| parsed.diagnostic())
                .unwrap_or_else(|_| status.to_string());
            return Err(LookupError::Throttled {
                provider: self.provider.id().to_string(),
                status,
            });
        }

        let parsed = self.provider.parse_response(status, &body)?;
        if !parsed.success {
            return Err(LookupError::Provider {
                provider: self.provider.id().to_string(),
                message: parsed.diagnostic(),
            });
        }

        let item = parsed.first_item().ok_or_else(|| LookupError::Provider {
            provider: self.provider.id().to_string(),
            message: format!("{} - no items returned", parsed.status),
        })?;

        self.provider.extraction().extract(item)
    }

    async fn send(&self, request: &LookupRequest) -> Result<Response, LookupError> {
        self.provider
            .authorize(self.client.get(request.url.clone()))
            .send()
            .await
            .map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, error: reqwest::Error) -> LookupError {
        let message = if error.is_timeout() {
            format!("timed out: {}", error)
        } else {
            error.to_string()
        };
        LookupError::Transport {
            provider: self.provider.id().to_string(),
            message,
        }
    }
}
