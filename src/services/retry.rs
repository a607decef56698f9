use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::models::DecimalCoordinate;
use crate::services::geocoder::{GeocodeError, Geocoder, Location};

/// Waits between attempts. Tests swap in an implementation that returns at once.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Geocoding with bounded retry on timeouts.
///
/// Only [`GeocodeError::Timeout`] is retried. Once every attempt has timed
/// out the lookup resolves to `Ok(None)`; any other error is returned as is.
/// Results are never cached.
pub struct GeocodeRetrier {
    geocoder: Arc<dyn Geocoder>,
    pause: Arc<dyn Pause>,
    policy: RetryPolicy,
}

impl GeocodeRetrier {
    pub fn new(geocoder: Arc<dyn Geocoder>, pause: Arc<dyn Pause>, policy: RetryPolicy) -> Self {
        Self {
            geocoder,
            pause,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn forward(&self, query: &str) -> Result<Option<Location>, GeocodeError> {
        self.forward_with_attempts(query, self.policy.max_attempts)
            .await
    }

    pub async fn forward_with_attempts(
        &self,
        query: &str,
        max_attempts: u32,
    ) -> Result<Option<Location>, GeocodeError> {
        self.with_retry(max_attempts, || self.geocoder.geocode(query))
            .await
    }

    pub async fn reverse(
        &self,
        position: DecimalCoordinate,
    ) -> Result<Option<Location>, GeocodeError> {
        self.reverse_with_attempts(position, self.policy.max_attempts)
            .await
    }

    pub async fn reverse_with_attempts(
        &self,
        position: DecimalCoordinate,
        max_attempts: u32,
    ) -> Result<Option<Location>, GeocodeError> {
        self.with_retry(max_attempts, || self.geocoder.reverse(position))
            .await
    }

    async fn with_retry<F, Fut>(
        &self,
        max_attempts: u32,
        mut call: F,
    ) -> Result<Option<Location>, GeocodeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<Location>, GeocodeError>>,
    {
        for attempt in 1..=max_attempts {
            match call().await {
                Err(GeocodeError::Timeout) => {
                    tracing::warn!(
                        "Geocoding timed out (attempt {}/{}), retrying in {:?}",
                        attempt,
                        max_attempts,
                        self.policy.delay
                    );
                    self.pause.pause(self.policy.delay).await;
                }
                other => return other,
            }
        }

        tracing::warn!("Geocoding gave up after {} timeouts", max_attempts);
        Ok(None)
    }
}
