use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::images::{ImageEntity, InsertImageEntity};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageRepository {
    /// Keyed by job id so a retried upload after an unacknowledged success
    /// cannot produce a duplicate row.
    async fn upsert_by_job_id(&self, insert_image: InsertImageEntity) -> Result<Uuid>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ImageEntity>>;
}
