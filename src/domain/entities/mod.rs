pub mod images;
pub mod subscriptions;
pub mod upload_jobs;
pub mod users;
