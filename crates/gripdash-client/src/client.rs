//! Retrying API client.
//!
//! Wraps an [`ApiTransport`] with a per-attempt deadline and a bounded
//! retry loop with linear backoff (`attempt x base_delay`). A payload
//! carrying `success: false` is a definitive server answer and is returned
//! immediately without retrying.

use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::transport::ApiTransport;

/// Per-attempt deadline applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default retry attempt ceiling.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff base; the delay after attempt N is `N x base`.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

/// One request to the backend.
#[derive(Debug, Clone)]
pub enum ApiRequest {
    Get {
        path: String,
        query: Vec<(String, String)>,
    },
    PostForm {
        path: String,
        form: Vec<(String, String)>,
    },
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        ApiRequest::Get {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn get_with_query(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        ApiRequest::Get {
            path: path.into(),
            query,
        }
    }

    pub fn post_form(path: impl Into<String>, form: Vec<(String, String)>) -> Self {
        ApiRequest::PostForm {
            path: path.into(),
            form,
        }
    }

    fn path(&self) -> &str {
        match self {
            ApiRequest::Get { path, .. } | ApiRequest::PostForm { path, .. } => path,
        }
    }
}

/// Retry bounds for [`ApiClient::call`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff base; delay after attempt N is `N x base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

/// Retrying client over an [`ApiTransport`].
pub struct ApiClient<T: ApiTransport> {
    transport: T,
    timeout: Duration,
    retry: RetryPolicy,
}

impl<T: ApiTransport> ApiClient<T> {
    /// Create a client with default timeout and retry bounds.
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, DEFAULT_TIMEOUT, RetryPolicy::default())
    }

    /// Create a client with explicit bounds.
    pub fn with_policy(transport: T, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            transport,
            timeout,
            retry,
        }
    }

    /// Issue one logical call: timeout per attempt, bounded linear-backoff
    /// retry across attempts.
    ///
    /// Retried: network errors, timeouts, non-2xx, malformed bodies.
    /// Not retried: `success: false` payloads ([`ApiError::Rejected`]) and
    /// local validation failures.
    pub async fn call(&self, request: &ApiRequest) -> ApiResult<Value> {
        let mut last: Option<ApiError> = None;

        for attempt in 1..=self.retry.max_attempts {
            match self.attempt(request).await {
                Ok(value) => {
                    if let Some(false) = value.get("success").and_then(Value::as_bool) {
                        let message = value
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("no message")
                            .to_string();
                        return Err(ApiError::Rejected(message));
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() => {
                    warn!(
                        path = request.path(),
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        error = %err,
                        "request attempt failed"
                    );
                    if attempt < self.retry.max_attempts {
                        sleep(self.retry.base_delay * attempt).await;
                    }
                    last = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(ApiError::Exhausted {
            attempts: self.retry.max_attempts,
            last: Box::new(last.unwrap_or_else(|| ApiError::Network("no attempts made".into()))),
        })
    }

    async fn attempt(&self, request: &ApiRequest) -> ApiResult<Value> {
        let exchange = async {
            match request {
                ApiRequest::Get { path, query } => self.transport.get(path, query).await,
                ApiRequest::PostForm { path, form } => self.transport.post_form(path, form).await,
            }
        };

        match timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockApiTransport;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1000),
        }
    }

    /// Transport whose requests never complete; counts attempts.
    struct StuckTransport {
        attempts: Arc<AtomicU32>,
    }

    #[async_trait]
    impl ApiTransport for StuckTransport {
        async fn get(&self, _path: &str, _query: &[(String, String)]) -> ApiResult<Value> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }

        async fn post_form(&self, _path: &str, _form: &[(String, String)]) -> ApiResult<Value> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_exhausts_after_exactly_three_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let transport = StuckTransport {
            attempts: attempts.clone(),
        };
        let client =
            ApiClient::with_policy(transport, Duration::from_millis(100), fast_policy(3));

        let started = tokio::time::Instant::now();
        let result = client.call(&ApiRequest::get("/read_all_status")).await;
        let elapsed = started.elapsed();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // Linear backoff: 1x1000 after attempt 1, 2x1000 after attempt 2.
        assert!(elapsed >= Duration::from_millis(3000), "elapsed {elapsed:?}");

        match result {
            Err(ApiError::Exhausted { attempts: 3, last }) => {
                assert!(matches!(*last, ApiError::Timeout(_)));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_then_succeed() {
        let mut transport = MockApiTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_get()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ApiError::Network("connection refused".into())));
        transport
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(json!({"success": true, "value": 1})));

        let client = ApiClient::with_policy(transport, DEFAULT_TIMEOUT, fast_policy(3));
        let value = client
            .call(&ApiRequest::get("/get_digital_output"))
            .await
            .expect("third attempt succeeds");
        assert_eq!(value["value"], 1);
    }

    #[tokio::test]
    async fn rejection_is_definitive_and_not_retried() {
        let mut transport = MockApiTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_, _| Ok(json!({"success": false, "message": "Modbus未连接，无法读取状态"})));

        let client = ApiClient::with_policy(transport, DEFAULT_TIMEOUT, fast_policy(3));
        let err = client
            .call(&ApiRequest::get("/read_all_status"))
            .await
            .unwrap_err();
        match err {
            ApiError::Rejected(message) => assert!(message.contains("未连接")),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn http_errors_exhaust_into_last_error() {
        let mut transport = MockApiTransport::new();
        transport
            .expect_post_form()
            .times(3)
            .returning(|_, _| Err(ApiError::Http { status: 502 }));

        let client = ApiClient::with_policy(transport, DEFAULT_TIMEOUT, fast_policy(3));
        let err = client
            .call(&ApiRequest::post_form("/disconnect", vec![]))
            .await
            .unwrap_err();
        match err {
            ApiError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, ApiError::Http { status: 502 }));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_payload_without_flag_passes_through() {
        // `/get_connection_status` has no `success` field at all.
        let mut transport = MockApiTransport::new();
        transport.expect_get().times(1).returning(|_, _| {
            Ok(json!({"status": "已连接", "attempts": 0, "max_attempts": 5}))
        });

        let client = ApiClient::new(transport);
        let value = client
            .call(&ApiRequest::get("/get_connection_status"))
            .await
            .unwrap();
        assert_eq!(value["status"], "已连接");
    }
}
