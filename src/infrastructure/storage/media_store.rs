use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde_json::Value;
use tracing::error;

use crate::application::interfaces::storage::{StorageClient, StorageUploadError, UploadedObject};

#[derive(Debug, Clone)]
pub struct MediaStoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// HTTP client for the remote media store. Failures are classified at this
/// boundary so the worker never inspects transport details itself.
pub struct MediaStoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MediaStoreClient {
    pub fn new(config: &MediaStoreConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build media store http client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429) || status.is_server_error()
}

#[async_trait]
impl StorageClient for MediaStoreClient {
    async fn upload_image(&self, bytes: &[u8], mime_type: &str) -> Result<UploadedObject> {
        let resp = self
            .http
            .post(format!("{}/upload", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, mime_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|err| {
                let message = if err.is_timeout() {
                    "media store request timed out"
                } else if err.is_connect() {
                    "media store is unreachable"
                } else {
                    "media store request failed"
                };
                StorageUploadError::retryable_with_source(message, err.into())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                status = %status,
                response_body = %body,
                "media store upload failed"
            );

            let message = format!("media store returned {status}");
            return Err(if is_retryable_status(status) {
                StorageUploadError::retryable(message)
            } else {
                StorageUploadError::non_retryable(message)
            });
        }

        let body: Value = resp.json().await.map_err(|err| {
            StorageUploadError::retryable_with_source(
                "media store response was not valid json",
                err.into(),
            )
        })?;

        let url = body
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| StorageUploadError::non_retryable("media store response has no url"))?
            .to_string();

        Ok(UploadedObject {
            url,
            metadata: body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_side_failures_are_retryable() {
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn client_side_rejections_are_not() {
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::PAYLOAD_TOO_LARGE));
        assert!(!is_retryable_status(StatusCode::UNPROCESSABLE_ENTITY));
    }
}
