use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::images;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = images)]
pub struct ImageEntity {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = images)]
pub struct InsertImageEntity {
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub metadata: Value,
}
