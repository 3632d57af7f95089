use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::upload_jobs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = upload_jobs)]
pub struct UploadJobEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_bytes: Vec<u8>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub attempts: i32,
    pub max_attempts: i32,
    pub run_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
    pub status: String,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = upload_jobs)]
pub struct InsertUploadJobEntity {
    pub user_id: Uuid,
    pub file_bytes: Vec<u8>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub attempts: i32,
    pub max_attempts: i32,
    pub run_at: DateTime<Utc>,
    pub status: String,
}
