use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{insert_into, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::upload_jobs::{InsertUploadJobEntity, UploadJobEntity},
        repositories::upload_jobs::UploadJobRepository,
        value_objects::{
            enums::job_statuses::JobStatus,
            retry::{FailureDisposition, failure_disposition},
        },
    },
    infrastructure::postgres::{postgres_connection::AppPgPool, schema::upload_jobs},
};

pub struct UploadJobPostgres {
    db_pool: Arc<AppPgPool>,
}

impl UploadJobPostgres {
    pub fn new(db_pool: Arc<AppPgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UploadJobRepository for UploadJobPostgres {
    async fn enqueue(&self, insert_job: InsertUploadJobEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(upload_jobs::table)
            .values(&insert_job)
            .returning(upload_jobs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn claim_next(
        &self,
        worker_id: &str,
        lease: Duration,
    ) -> Result<Option<UploadJobEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();
        let lease_cutoff = current_time - chrono::Duration::from_std(lease)?;

        // FOR UPDATE SKIP LOCKED keeps concurrent workers from racing on the
        // same row. A processing job whose lease expired is claimable again;
        // that is where the at-least-once duplicate window comes from.
        let job = conn.transaction::<Option<UploadJobEntity>, diesel::result::Error, _>(|conn| {
            let candidate: Option<UploadJobEntity> = upload_jobs::table
                .select(UploadJobEntity::as_select())
                .filter(
                    upload_jobs::status
                        .eq(JobStatus::Queued.to_string())
                        .and(upload_jobs::run_at.le(current_time))
                        .or(upload_jobs::status
                            .eq(JobStatus::Processing.to_string())
                            .and(upload_jobs::locked_at.lt(lease_cutoff))),
                )
                .order(upload_jobs::run_at.asc())
                .for_update()
                .skip_locked()
                .first::<UploadJobEntity>(conn)
                .optional()?;

            if let Some(job) = candidate {
                let claimed = update(upload_jobs::table.find(job.id))
                    .set((
                        upload_jobs::status.eq(JobStatus::Processing.to_string()),
                        upload_jobs::locked_at.eq(Some(current_time)),
                        upload_jobs::locked_by.eq(Some(worker_id.to_string())),
                    ))
                    .returning(UploadJobEntity::as_returning())
                    .get_result::<UploadJobEntity>(conn)?;
                Ok(Some(claimed))
            } else {
                Ok(None)
            }
        })?;

        Ok(job)
    }

    async fn ack(&self, job_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(upload_jobs::table.find(job_id))
            .set((
                upload_jobs::status.eq(JobStatus::Succeeded.to_string()),
                upload_jobs::locked_at.eq(None::<chrono::DateTime<Utc>>),
                upload_jobs::locked_by.eq(None::<String>),
                upload_jobs::error.eq(None::<String>),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn fail(&self, job_id: Uuid, error: &str, retryable: bool) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();

        let job = upload_jobs::table
            .find(job_id)
            .select(UploadJobEntity::as_select())
            .first::<UploadJobEntity>(&mut conn)?;

        let new_attempts = job.attempts + 1;
        let (new_status, next_run_at) =
            match failure_disposition(new_attempts, job.max_attempts, retryable) {
                FailureDisposition::Retry { delay } => (JobStatus::Queued, current_time + delay),
                FailureDisposition::Terminal => (JobStatus::Failed, current_time),
            };

        update(upload_jobs::table.find(job_id))
            .set((
                upload_jobs::status.eq(new_status.to_string()),
                upload_jobs::attempts.eq(new_attempts),
                upload_jobs::error.eq(Some(error)),
                upload_jobs::run_at.eq(next_run_at),
                upload_jobs::locked_at.eq(None::<chrono::DateTime<Utc>>),
                upload_jobs::locked_by.eq(None::<String>),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn find_by_id(&self, job_id: Uuid) -> Result<Option<UploadJobEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = upload_jobs::table
            .find(job_id)
            .select(UploadJobEntity::as_select())
            .first::<UploadJobEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
