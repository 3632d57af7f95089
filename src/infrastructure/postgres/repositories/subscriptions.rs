use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{insert_into, prelude::*, update, upsert::excluded};
use uuid::Uuid;

use crate::{
    domain::{
        entities::subscriptions::{
            InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionEntity,
        },
        repositories::subscriptions::SubscriptionRepository,
        value_objects::enums::subscription_statuses::SubscriptionStatus,
    },
    infrastructure::postgres::{postgres_connection::AppPgPool, schema::subscriptions},
};

pub struct SubscriptionPostgres {
    db_pool: Arc<AppPgPool>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<AppPgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn upsert_by_code(&self, insert_subscription: InsertSubscriptionEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // subscription_code carries a unique index, so a redelivered event
        // lands on the same row instead of inserting a duplicate.
        let result = insert_into(subscriptions::table)
            .values(&insert_subscription)
            .on_conflict(subscriptions::subscription_code)
            .do_update()
            .set((
                subscriptions::plan.eq(excluded(subscriptions::plan)),
                subscriptions::amount_minor.eq(excluded(subscriptions::amount_minor)),
                subscriptions::status.eq(excluded(subscriptions::status)),
                subscriptions::next_payment_date.eq(excluded(subscriptions::next_payment_date)),
                subscriptions::email_token.eq(excluded(subscriptions::email_token)),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .returning(subscriptions::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_code(&self, subscription_code: &str) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .filter(subscriptions::subscription_code.eq(subscription_code))
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .find(subscription_id)
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn update_billing_fields(
        &self,
        subscription_id: Uuid,
        update_entity: UpdateSubscriptionEntity,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscriptions::table.find(subscription_id))
            .set((update_entity, subscriptions::updated_at.eq(Utc::now())))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_cancelled(&self, subscription_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscriptions::table.find(subscription_id))
            .set((
                subscriptions::status.eq(SubscriptionStatus::Cancelled.to_string()),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_active_for_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .order(subscriptions::created_at.desc())
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn deactivate_other_active(&self, user_id: Uuid, keep_code: &str) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(subscriptions::table)
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .filter(subscriptions::subscription_code.is_distinct_from(keep_code))
            .set((
                subscriptions::status.eq(SubscriptionStatus::Cancelled.to_string()),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
