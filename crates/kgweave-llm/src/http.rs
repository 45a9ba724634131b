//! Shared HTTP plumbing for the network providers

use crate::LlmError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Build a reqwest client with the provider timeout applied
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Longest wait between two attempts is `2^MAX_BACKOFF_EXPONENT` seconds
const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Wait before retry number `attempt` (1-based): 1s, 2s, 4s, ... capped at 64s
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
    Duration::from_secs(1u64 << exponent)
}

/// Send a request built by `build`, retrying transport failures and 5xx
/// responses with exponential backoff (1s, 2s, 4s, ...).
///
/// Client errors (4xx) are not retried; 404 maps to `ModelNotAvailable` and
/// 429 to `RateLimitExceeded`.
pub(crate) async fn send_json<T, F>(
    build: F,
    model: &str,
    timeout_secs: u64,
    max_retries: u32,
) -> Result<T, LlmError>
where
    T: DeserializeOwned,
    F: Fn() -> reqwest::RequestBuilder,
{
    let attempts_allowed = max_retries.max(1);
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < attempts_allowed {
        match build().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response.json::<T>().await.map_err(|e| {
                        LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                    });
                }
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(LlmError::ModelNotAvailable(model.to_string()));
                }

                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    warn!("Rate limited by provider: {}", error_text);
                    last_error = Some(LlmError::RateLimitExceeded);
                } else if status.is_server_error() {
                    last_error = Some(LlmError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                } else {
                    return Err(LlmError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
            }
            Err(e) if e.is_timeout() => {
                last_error = Some(LlmError::Timeout(timeout_secs));
            }
            Err(e) => {
                last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
            }
        }

        attempts += 1;
        if attempts < attempts_allowed {
            let delay = backoff_delay(attempts);
            debug!("Retrying LLM request in {:?} (attempt {})", delay, attempts + 1);
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error
        .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(4), Duration::from_secs(8));
        assert_eq!(backoff_delay(7), Duration::from_secs(64));
        assert_eq!(backoff_delay(65), Duration::from_secs(64));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_secs(64));
    }
}
