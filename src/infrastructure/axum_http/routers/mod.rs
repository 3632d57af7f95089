pub mod auth;
pub mod images;
pub mod subscriptions;
pub mod webhooks;
