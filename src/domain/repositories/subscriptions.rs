use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::subscriptions::{
    InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionEntity,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository {
    /// Insert-or-refresh keyed by the provider's subscription code. Safe to
    /// run twice with the same input.
    async fn upsert_by_code(&self, insert_subscription: InsertSubscriptionEntity) -> Result<Uuid>;
    async fn find_by_code(&self, subscription_code: &str) -> Result<Option<SubscriptionEntity>>;
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>>;
    async fn update_billing_fields(
        &self,
        subscription_id: Uuid,
        update: UpdateSubscriptionEntity,
    ) -> Result<()>;
    async fn mark_cancelled(&self, subscription_id: Uuid) -> Result<()>;
    async fn list_active_for_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>>;
    /// Cancels every other active subscription the user holds, keeping only
    /// the given code active.
    async fn deactivate_other_active(&self, user_id: Uuid, keep_code: &str) -> Result<usize>;
}
