use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// [`Transport`] over HTTP using a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Uses a caller-built client, e.g. one with custom TLS or proxy settings.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(name = "http", fields(method = %request.method, path = %request.path), skip(self, request))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(error = %e, "Request failed to send");
            ApiError::Transport(e.to_string())
        })?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| {
            error!(error = %e, status, "Failed to read response body");
            ApiError::Transport(e.to_string())
        })?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        debug!(status, "Response received");
        Ok(ApiResponse { status, body })
    }
}
