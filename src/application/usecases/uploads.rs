use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::upload_jobs::InsertUploadJobEntity,
    repositories::{images::ImageRepository, upload_jobs::UploadJobRepository},
    value_objects::{
        enums::job_statuses::JobStatus,
        retry::DEFAULT_MAX_ATTEMPTS,
        uploads::{ImageDto, MAX_UPLOAD_SIZE_BYTES, UploadJobStatusDto, is_allowed_image_mime},
    },
};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported mime type: {0}")]
    InvalidMimeType(String),
    #[error("file exceeds the maximum upload size")]
    FileTooLarge,
    #[error("upload job not found")]
    JobNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UploadError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            UploadError::InvalidMimeType(_) | UploadError::FileTooLarge => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            UploadError::JobNotFound => StatusCode::NOT_FOUND,
            UploadError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Fire-and-forget submission path. Validation happens here, synchronously;
/// the actual upload is the worker's problem.
pub struct UploadUseCase<J, I>
where
    J: UploadJobRepository + Send + Sync + 'static,
    I: ImageRepository + Send + Sync + 'static,
{
    job_repo: Arc<J>,
    image_repo: Arc<I>,
}

impl<J, I> UploadUseCase<J, I>
where
    J: UploadJobRepository + Send + Sync + 'static,
    I: ImageRepository + Send + Sync + 'static,
{
    pub fn new(job_repo: Arc<J>, image_repo: Arc<I>) -> Self {
        Self {
            job_repo,
            image_repo,
        }
    }

    pub async fn submit_upload(
        &self,
        user_id: Uuid,
        mime_type: &str,
        file_bytes: Vec<u8>,
    ) -> Result<Uuid, UploadError> {
        if !is_allowed_image_mime(mime_type) {
            warn!(%user_id, mime_type, "uploads: rejected unsupported mime type");
            return Err(UploadError::InvalidMimeType(mime_type.to_string()));
        }

        let size_bytes = file_bytes.len() as i64;
        if size_bytes > MAX_UPLOAD_SIZE_BYTES {
            warn!(%user_id, size_bytes, "uploads: rejected oversized file");
            return Err(UploadError::FileTooLarge);
        }

        let job_id = self
            .job_repo
            .enqueue(InsertUploadJobEntity {
                user_id,
                file_bytes,
                mime_type: mime_type.to_string(),
                size_bytes,
                attempts: 0,
                max_attempts: DEFAULT_MAX_ATTEMPTS,
                run_at: Utc::now(),
                status: JobStatus::Queued.to_string(),
            })
            .await?;

        info!(%user_id, %job_id, size_bytes, "uploads: job enqueued");
        Ok(job_id)
    }

    pub async fn job_status(&self, job_id: Uuid) -> Result<UploadJobStatusDto, UploadError> {
        let job = self
            .job_repo
            .find_by_id(job_id)
            .await?
            .ok_or(UploadError::JobNotFound)?;

        Ok(UploadJobStatusDto {
            job_id: job.id,
            status: job.status,
            attempts: job.attempts,
            max_attempts: job.max_attempts,
            error: job.error,
        })
    }

    pub async fn list_images(&self, user_id: Uuid) -> Result<Vec<ImageDto>, UploadError> {
        let images = self.image_repo.list_for_user(user_id).await?;
        Ok(images
            .into_iter()
            .map(|image| ImageDto {
                id: image.id,
                url: image.url,
                created_at: image.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::repositories::{
        images::MockImageRepository, upload_jobs::MockUploadJobRepository,
    };

    #[tokio::test]
    async fn valid_jpeg_is_enqueued_as_queued() {
        let user_id = Uuid::new_v4();
        let mut job_repo = MockUploadJobRepository::new();
        job_repo
            .expect_enqueue()
            .withf(move |insert| {
                insert.user_id == user_id
                    && insert.status == JobStatus::Queued.to_string()
                    && insert.attempts == 0
                    && insert.size_bytes == 3
            })
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let usecase = UploadUseCase::new(Arc::new(job_repo), Arc::new(MockImageRepository::new()));
        usecase
            .submit_upload(user_id, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn text_plain_is_rejected_before_enqueue() {
        // No enqueue expectation: submission must fail synchronously.
        let usecase = UploadUseCase::new(
            Arc::new(MockUploadJobRepository::new()),
            Arc::new(MockImageRepository::new()),
        );

        let result = usecase
            .submit_upload(Uuid::new_v4(), "text/plain", vec![1, 2, 3])
            .await;
        assert!(matches!(result, Err(UploadError::InvalidMimeType(_))));
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let usecase = UploadUseCase::new(
            Arc::new(MockUploadJobRepository::new()),
            Arc::new(MockImageRepository::new()),
        );

        let oversized = vec![0u8; (MAX_UPLOAD_SIZE_BYTES + 1) as usize];
        let result = usecase
            .submit_upload(Uuid::new_v4(), "image/png", oversized)
            .await;
        assert!(matches!(result, Err(UploadError::FileTooLarge)));
    }
}
