use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    application::usecases::uploads::UploadUseCase,
    domain::repositories::{images::ImageRepository, upload_jobs::UploadJobRepository},
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::error_response},
        postgres::{
            postgres_connection::AppPgPool,
            repositories::{images::ImagePostgres, upload_jobs::UploadJobPostgres},
        },
    },
};

pub fn routes(db_pool: Arc<AppPgPool>) -> Router {
    let job_repository = UploadJobPostgres::new(Arc::clone(&db_pool));
    let image_repository = ImagePostgres::new(Arc::clone(&db_pool));
    let upload_usecase = UploadUseCase::new(Arc::new(job_repository), Arc::new(image_repository));

    Router::new()
        .route("/", post(upload_image).get(list_images))
        .route("/jobs/:job_id", get(job_status))
        .with_state(Arc::new(upload_usecase))
}

/// Accepts the raw file body and answers 202 with the queued job id; the
/// actual push to the media store happens on the worker.
pub async fn upload_image<J, I>(
    State(upload_usecase): State<Arc<UploadUseCase<J, I>>>,
    auth: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    J: UploadJobRepository + Send + Sync + 'static,
    I: ImageRepository + Send + Sync + 'static,
{
    let Some(mime_type) = headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Missing Content-Type header");
    };

    match upload_usecase
        .submit_upload(auth.user_id, mime_type, body.to_vec())
        .await
    {
        Ok(job_id) => (StatusCode::ACCEPTED, Json(json!({ "job_id": job_id }))).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn job_status<J, I>(
    State(upload_usecase): State<Arc<UploadUseCase<J, I>>>,
    _auth: AuthUser,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse
where
    J: UploadJobRepository + Send + Sync + 'static,
    I: ImageRepository + Send + Sync + 'static,
{
    match upload_usecase.job_status(job_id).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn list_images<J, I>(
    State(upload_usecase): State<Arc<UploadUseCase<J, I>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    J: UploadJobRepository + Send + Sync + 'static,
    I: ImageRepository + Send + Sync + 'static,
{
    match upload_usecase.list_images(auth.user_id).await {
        Ok(images) => (StatusCode::OK, Json(images)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
