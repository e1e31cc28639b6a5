//! Single-attempt HTTP transport.
//!
//! [`ApiTransport`] is the seam between the retry layer and the wire: one
//! exchange, no retry, no shared state. The real implementation rides on
//! `reqwest`; tests mock the trait instead of standing up a server.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// One HTTP exchange with the backend.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// GET `path` with a query string.
    async fn get(&self, path: &str, query: &[(String, String)]) -> ApiResult<Value>;

    /// POST `path` with form-encoded fields (the backend takes form data,
    /// not JSON bodies).
    async fn post_form(&self, path: &str, form: &[(String, String)]) -> ApiResult<Value>;
}

/// `reqwest`-backed transport bound to one backend host.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given base URL, e.g.
    /// `http://192.168.1.50:8000`.
    ///
    /// No client-level timeout is set; the retry layer owns the per-attempt
    /// deadline.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json(response: reqwest::Response) -> ApiResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn map_send_error(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> ApiResult<Value> {
        debug!(path, "GET");
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(map_send_error)?;
        Self::read_json(response).await
    }

    async fn post_form(&self, path: &str, form: &[(String, String)]) -> ApiResult<Value> {
        debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .map_err(map_send_error)?;
        Self::read_json(response).await
    }
}
