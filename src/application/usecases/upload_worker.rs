use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tracing::{error, info};

use crate::{
    application::interfaces::storage::{
        StorageClient, StorageUploadError, is_retryable_upload_error,
    },
    domain::{
        entities::{images::InsertImageEntity, upload_jobs::UploadJobEntity},
        repositories::{images::ImageRepository, upload_jobs::UploadJobRepository},
        value_objects::uploads::is_allowed_image_mime,
    },
};

#[derive(Debug, Clone)]
pub struct UploadWorkerSettings {
    pub worker_id: String,
    pub poll_interval: Duration,
    pub lease: Duration,
}

/// Drains the upload queue: claim, push to the object store, persist the
/// image row, acknowledge. Failures are classified and handed back to the
/// queue, which owns the retry schedule.
pub async fn run_upload_worker_loop(
    job_repo: Arc<dyn UploadJobRepository + Send + Sync>,
    image_repo: Arc<dyn ImageRepository + Send + Sync>,
    storage: Arc<dyn StorageClient + Send + Sync>,
    settings: UploadWorkerSettings,
) -> Result<()> {
    info!(worker_id = %settings.worker_id, "starting upload worker loop");
    loop {
        match job_repo
            .claim_next(&settings.worker_id, settings.lease)
            .await
        {
            Ok(Some(job)) => {
                handle_claimed_job(&job_repo, &image_repo, &storage, &job).await;
            }
            Ok(None) => {
                tokio::time::sleep(settings.poll_interval).await;
            }
            Err(err) => {
                error!(worker_id = %settings.worker_id, error = ?err, "failed to claim next job");
                tokio::time::sleep(settings.poll_interval).await;
            }
        }
    }
}

async fn handle_claimed_job(
    job_repo: &Arc<dyn UploadJobRepository + Send + Sync>,
    image_repo: &Arc<dyn ImageRepository + Send + Sync>,
    storage: &Arc<dyn StorageClient + Send + Sync>,
    job: &UploadJobEntity,
) {
    info!(job_id = %job.id, attempt = job.attempts + 1, "processing upload job");
    match process_upload_job(image_repo, storage, job).await {
        Ok(()) => {
            if let Err(err) = job_repo.ack(job.id).await {
                // The image row is already durable; the lease will expire and
                // a retry hits the idempotent upsert.
                error!(job_id = %job.id, error = ?err, "failed to ack completed job");
            } else {
                info!(job_id = %job.id, "upload job completed");
            }
        }
        Err(err) => {
            let retryable = is_retryable_upload_error(&err);
            error!(
                job_id = %job.id,
                retryable,
                error = ?err,
                "upload job attempt failed"
            );
            if let Err(mark_err) = job_repo.fail(job.id, &err.to_string(), retryable).await {
                error!(job_id = %job.id, error = ?mark_err, "failed to record job failure");
            }
        }
    }
}

async fn process_upload_job(
    image_repo: &Arc<dyn ImageRepository + Send + Sync>,
    storage: &Arc<dyn StorageClient + Send + Sync>,
    job: &UploadJobEntity,
) -> Result<()> {
    // Retrying a categorically invalid file would only burn attempts.
    if !is_allowed_image_mime(&job.mime_type) {
        return Err(StorageUploadError::non_retryable(format!(
            "unsupported mime type: {}",
            job.mime_type
        )));
    }

    let uploaded = storage
        .upload_image(&job.file_bytes, &job.mime_type)
        .await?;

    image_repo
        .upsert_by_job_id(InsertImageEntity {
            job_id: job.id,
            user_id: job.user_id,
            url: uploaded.url,
            metadata: uploaded.metadata,
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;
    use uuid::Uuid;

    use crate::{
        application::interfaces::storage::{MockStorageClient, UploadedObject},
        domain::{
            repositories::{
                images::MockImageRepository, upload_jobs::MockUploadJobRepository,
            },
            value_objects::{enums::job_statuses::JobStatus, retry::DEFAULT_MAX_ATTEMPTS},
        },
    };

    fn job_fixture(mime_type: &str) -> UploadJobEntity {
        UploadJobEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            file_bytes: vec![0xFF, 0xD8, 0xFF],
            mime_type: mime_type.to_string(),
            size_bytes: 3,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            run_at: Utc::now(),
            locked_at: Some(Utc::now()),
            locked_by: Some("worker-test".to_string()),
            status: JobStatus::Processing.to_string(),
            error: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn successful_job_upserts_image_and_acks() {
        let job = job_fixture("image/jpeg");
        let job_id = job.id;
        let user_id = job.user_id;

        let mut storage = MockStorageClient::new();
        storage
            .expect_upload_image()
            .withf(|bytes, mime| bytes == [0xFF, 0xD8, 0xFF] && mime == "image/jpeg")
            .times(1)
            .returning(|_, _| {
                Ok(UploadedObject {
                    url: "https://cdn.example.com/abc.jpg".to_string(),
                    metadata: serde_json::json!({ "bytes": 3 }),
                })
            });

        let mut image_repo = MockImageRepository::new();
        image_repo
            .expect_upsert_by_job_id()
            .withf(move |insert| {
                insert.job_id == job_id
                    && insert.user_id == user_id
                    && insert.url == "https://cdn.example.com/abc.jpg"
            })
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let mut job_repo = MockUploadJobRepository::new();
        job_repo
            .expect_ack()
            .with(eq(job_id))
            .times(1)
            .returning(|_| Ok(()));

        let job_repo: Arc<dyn UploadJobRepository + Send + Sync> = Arc::new(job_repo);
        let image_repo: Arc<dyn ImageRepository + Send + Sync> = Arc::new(image_repo);
        let storage: Arc<dyn StorageClient + Send + Sync> = Arc::new(storage);

        handle_claimed_job(&job_repo, &image_repo, &storage, &job).await;
    }

    #[tokio::test]
    async fn non_image_mime_fails_terminally_without_upload() {
        let job = job_fixture("text/plain");
        let job_id = job.id;

        // Storage and image repo get no expectations: the job must not reach
        // them.
        let storage: Arc<dyn StorageClient + Send + Sync> = Arc::new(MockStorageClient::new());
        let image_repo: Arc<dyn ImageRepository + Send + Sync> =
            Arc::new(MockImageRepository::new());

        let mut job_repo = MockUploadJobRepository::new();
        job_repo
            .expect_fail()
            .withf(move |id, _error, retryable| *id == job_id && !*retryable)
            .times(1)
            .returning(|_, _, _| Ok(()));
        let job_repo: Arc<dyn UploadJobRepository + Send + Sync> = Arc::new(job_repo);

        handle_claimed_job(&job_repo, &image_repo, &storage, &job).await;
    }

    #[tokio::test]
    async fn transient_upload_failure_is_requeued() {
        let job = job_fixture("image/png");
        let job_id = job.id;

        let mut storage = MockStorageClient::new();
        storage
            .expect_upload_image()
            .returning(|_, _| Err(StorageUploadError::retryable("upstream timed out")));
        let storage: Arc<dyn StorageClient + Send + Sync> = Arc::new(storage);

        let image_repo: Arc<dyn ImageRepository + Send + Sync> =
            Arc::new(MockImageRepository::new());

        let mut job_repo = MockUploadJobRepository::new();
        job_repo
            .expect_fail()
            .withf(move |id, _error, retryable| *id == job_id && *retryable)
            .times(1)
            .returning(|_, _, _| Ok(()));
        let job_repo: Arc<dyn UploadJobRepository + Send + Sync> = Arc::new(job_repo);

        handle_claimed_job(&job_repo, &image_repo, &storage, &job).await;
    }
}
