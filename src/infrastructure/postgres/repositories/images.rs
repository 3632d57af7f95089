use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{insert_into, prelude::*, upsert::excluded};
use uuid::Uuid;

use crate::{
    domain::{
        entities::images::{ImageEntity, InsertImageEntity},
        repositories::images::ImageRepository,
    },
    infrastructure::postgres::{postgres_connection::AppPgPool, schema::images},
};

pub struct ImagePostgres {
    db_pool: Arc<AppPgPool>,
}

impl ImagePostgres {
    pub fn new(db_pool: Arc<AppPgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ImageRepository for ImagePostgres {
    async fn upsert_by_job_id(&self, insert_image: InsertImageEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(images::table)
            .values(&insert_image)
            .on_conflict(images::job_id)
            .do_update()
            .set((
                images::url.eq(excluded(images::url)),
                images::metadata.eq(excluded(images::metadata)),
            ))
            .returning(images::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ImageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = images::table
            .filter(images::user_id.eq(user_id))
            .order(images::created_at.desc())
            .select(ImageEntity::as_select())
            .load::<ImageEntity>(&mut conn)?;

        Ok(results)
    }
}
