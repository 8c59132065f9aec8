//! HTTP Client Abstraction
//!
//! Streaming downloads from the font origin, plus the retry policy desktop
//! clients apply before a body starts flowing.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Retry policy for establishing a download
///
/// Only the request phase is retried (transport failures, 5xx, 429). Once
/// body bytes have been handed out a failure is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Whether to use exponential backoff
    pub use_exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            use_exponential_backoff: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that performs exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait before the given retry (1-based attempt that just failed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.use_exponential_backoff {
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
            self.base_delay.saturating_mul(factor).min(self.max_delay)
        } else {
            self.base_delay
        }
    }
}

/// Async HTTP client trait
///
/// Implementations should handle:
/// - TLS certificate validation
/// - Connection pooling and keep-alive
/// - Retrying transient failures before the body starts, if they want to
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::HttpClient;
///
/// async fn fetch(client: &dyn HttpClient, url: &str) -> Result<()> {
///     let mut body = client.download_stream(url.to_string()).await?;
///     // copy `body` to disk
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Download a resource as a stream of bytes
    ///
    /// Implementations must fail with [`BridgeError::Http`] when the remote
    /// answers with a non-success status, and with [`BridgeError::Network`]
    /// for transport failures, before any body byte is handed out.
    ///
    /// [`BridgeError::Http`]: crate::error::BridgeError::Http
    /// [`BridgeError::Network`]: crate::error::BridgeError::Network
    async fn download_stream(
        &self,
        url: String,
    ) -> Result<Box<dyn core_async::io::AsyncRead + Send + Unpin>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));

        let capped = RetryPolicy {
            max_delay: Duration::from_millis(250),
            ..RetryPolicy::default()
        };
        assert_eq!(capped.delay_for(3), Duration::from_millis(250));

        assert_eq!(RetryPolicy::no_retry().max_attempts, 1);
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy {
            use_exponential_backoff: false,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(1), policy.delay_for(4));
    }
}
