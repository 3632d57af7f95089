use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};

use crate::{
    application::{interfaces::payments::PaystackGateway, usecases::webhooks::WebhookUseCase},
    domain::repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
    infrastructure::{
        axum_http::error_responses::error_response,
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
    let webhook_usecase = WebhookUseCase::new(
        Arc::new(user_repository),
        Arc::new(subscription_repository),
        paystack,
    );

    Router::new()
        .route("/paystack", post(handle_paystack_webhook))
        .with_state(Arc::new(webhook_usecase))
}

/// Unauthenticated by design; trust comes from the signature over the raw
/// body. The body must reach verification byte-for-byte as delivered.
pub async fn handle_paystack_webhook<U, S, P>(
    State(webhook_usecase): State<Arc<WebhookUseCase<U, S, P>>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaystackGateway + Send + Sync + 'static,
{
    let Some(signature) = headers
        .get("x-paystack-signature")
        .and_then(|value| value.to_str().ok())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Missing x-paystack-signature header");
    };

    match webhook_usecase.handle_webhook(&body, signature).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
