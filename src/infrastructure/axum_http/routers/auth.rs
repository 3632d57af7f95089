use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::{
    application::usecases::auth::AuthUseCase,
    config::config_model::JwtSecret,
    domain::{repositories::users::UserRepository, value_objects::iam::CredentialsModel},
    infrastructure::{
        axum_http::error_responses::error_response,
        postgres::{postgres_connection::AppPgPool, repositories::users::UserPostgres},
    },
};

pub fn routes(db_pool: Arc<AppPgPool>, jwt: JwtSecret) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let auth_usecase = AuthUseCase::new(Arc::new(user_repository), jwt.secret, jwt.ttl_secs);

    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .with_state(Arc::new(auth_usecase))
}

pub async fn signup<U>(
    State(auth_usecase): State<Arc<AuthUseCase<U>>>,
    Json(credentials): Json<CredentialsModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match auth_usecase
        .signup(&credentials.email, &credentials.password)
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn signin<U>(
    State(auth_usecase): State<Arc<AuthUseCase<U>>>,
    Json(credentials): Json<CredentialsModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match auth_usecase
        .signin(&credentials.email, &credentials.password)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
