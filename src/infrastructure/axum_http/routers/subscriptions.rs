use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    application::{interfaces::payments::PaystackGateway, usecases::subscriptions::SubscriptionUseCase},
    domain::{
        repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
        value_objects::subscriptions::InitializeSubscriptionModel,
    },
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::error_response},
        paystack::paystack_client::PaystackClient,
        postgres::{
            postgres_connection::AppPgPool,
            repositories::{subscriptions::SubscriptionPostgres, users::UserPostgres},
        },
    },
};

pub fn routes(db_pool: Arc<AppPgPool>, paystack: Arc<PaystackClient>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let subscription_usecase = SubscriptionUseCase::new(
        Arc::new(user_repository),
        Arc::new(subscription_repository),
        paystack,
    );

    Router::new()
        .route("/initialize", post(initialize))
        .route("/active", get(fetch_active))
        .route("/:subscription_id/cancel", post(cancel))
        .with_state(Arc::new(subscription_usecase))
}

pub async fn initialize<U, S, P>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<U, S, P>>>,
    auth: AuthUser,
    Json(model): Json<InitializeSubscriptionModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaystackGateway + Send + Sync + 'static,
{
    match subscription_usecase
        .initialize(auth.user_id, &model.plan, model.amount)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn fetch_active<U, S, P>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<U, S, P>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaystackGateway + Send + Sync + 'static,
{
    match subscription_usecase.fetch_active(auth.user_id).await {
        Ok(subscriptions) => (StatusCode::OK, Json(subscriptions)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn cancel<U, S, P>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<U, S, P>>>,
    auth: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaystackGateway + Send + Sync + 'static,
{
    match subscription_usecase.cancel(auth.user_id, subscription_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
