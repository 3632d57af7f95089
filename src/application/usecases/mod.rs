pub mod auth;
pub mod subscriptions;
pub mod upload_worker;
pub mod uploads;
pub mod webhooks;
