use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::upload_jobs::{InsertUploadJobEntity, UploadJobEntity};

/// Durable work queue for image uploads. Every transition is persisted;
/// claims are atomic across concurrent workers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadJobRepository {
    async fn enqueue(&self, insert_job: InsertUploadJobEntity) -> Result<Uuid>;
    /// Claims the oldest ready job, or a job whose lease expired while a
    /// previous worker held it. Returns `None` when nothing is due.
    async fn claim_next(&self, worker_id: &str, lease: Duration) -> Result<Option<UploadJobEntity>>;
    async fn ack(&self, job_id: Uuid) -> Result<()>;
    /// Records a failed attempt. Non-retryable failures and exhausted
    /// attempts go terminal; otherwise the job is requeued with backoff.
    async fn fail(&self, job_id: Uuid, error: &str, retryable: bool) -> Result<()>;
    async fn find_by_id(&self, job_id: Uuid) -> Result<Option<UploadJobEntity>>;
}
