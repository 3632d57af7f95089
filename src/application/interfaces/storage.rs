use std::error::Error as StdError;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct UploadedObject {
    pub url: String,
    pub metadata: Value,
}

/// Remote object store the upload worker streams files to. The concrete
/// client lives in infrastructure; workers only see this seam.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageClient {
    async fn upload_image(&self, bytes: &[u8], mime_type: &str) -> Result<UploadedObject>;
}

/// Upload failure carrying a retryability verdict. Timeouts and 5xx-class
/// responses are retryable; rejected payloads are not.
#[derive(Debug)]
pub struct StorageUploadError {
    retryable: bool,
    message: String,
    source: Option<anyhow::Error>,
}

impl StorageUploadError {
    pub fn retryable(message: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(Self {
            retryable: true,
            message: message.into(),
            source: None,
        })
    }

    pub fn retryable_with_source(message: impl Into<String>, source: anyhow::Error) -> anyhow::Error {
        anyhow::Error::new(Self {
            retryable: true,
            message: message.into(),
            source: Some(source),
        })
    }

    pub fn non_retryable(message: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(Self {
            retryable: false,
            message: message.into(),
            source: None,
        })
    }

    pub fn non_retryable_with_source(
        message: impl Into<String>,
        source: anyhow::Error,
    ) -> anyhow::Error {
        anyhow::Error::new(Self {
            retryable: false,
            message: message.into(),
            source: Some(source),
        })
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl std::fmt::Display for StorageUploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for StorageUploadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|err| err.as_ref())
    }
}

/// Unknown errors default to retryable so a transient blip never strands a job.
pub fn is_retryable_upload_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StorageUploadError>()
        .map(StorageUploadError::is_retryable)
        .unwrap_or(true)
}
