pub mod axum_http;
pub mod paystack;
pub mod postgres;
pub mod storage;
