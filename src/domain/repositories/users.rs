use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    entities::users::{InsertUserEntity, UserEntity},
    value_objects::enums::subscription_flags::SubscriptionFlag,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository {
    async fn create(&self, insert_user: InsertUserEntity) -> Result<UserEntity>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;
    async fn set_subscription_flag(&self, user_id: Uuid, flag: SubscriptionFlag) -> Result<()>;
}
