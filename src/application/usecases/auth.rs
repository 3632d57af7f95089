use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{
    entities::users::{InsertUserEntity, UserEntity},
    repositories::users::UserRepository,
    value_objects::{
        enums::subscription_flags::SubscriptionFlag,
        iam::{SigninResponseDto, UserDto},
    },
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user with this email already exists")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

pub struct AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    jwt_secret: String,
    token_ttl_secs: i64,
}

impl<U> AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, jwt_secret: String, token_ttl_secs: i64) -> Self {
        Self {
            user_repo,
            jwt_secret,
            token_ttl_secs,
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<UserDto, AuthError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            warn!(email, "auth: signup for existing email");
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_repo
            .create(InsertUserEntity {
                email: email.to_string(),
                password_hash,
                subscription_active: SubscriptionFlag::Inactive.to_string(),
            })
            .await?;

        info!(user_id = %user.id, "auth: user signed up");
        Ok(to_dto(user))
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<SigninResponseDto, AuthError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "auth: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = issue_token(&user, &self.jwt_secret, self.token_ttl_secs)?;
        info!(user_id = %user.id, "auth: signin successful");
        Ok(SigninResponseDto {
            user: to_dto(user),
            token,
        })
    }
}

fn to_dto(user: UserEntity) -> UserDto {
    UserDto {
        id: user.id,
        email: user.email,
        subscription_active: user.subscription_active,
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AuthError::Internal(anyhow!("failed to hash password: {err}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|err| AuthError::Internal(anyhow!("stored password hash is invalid: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn issue_token(user: &UserEntity, secret: &str, ttl_secs: i64) -> Result<String, AuthError> {
    let exp = (Utc::now() + chrono::Duration::seconds(ttl_secs)).timestamp() as usize;
    let claims = AuthClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| AuthError::Internal(anyhow!("failed to issue token: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};
    use uuid::Uuid;

    use crate::domain::repositories::users::MockUserRepository;

    fn user_with_password(password: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            email: "u1@example.com".to_string(),
            password_hash: hash_password(password).unwrap(),
            subscription_active: SubscriptionFlag::Inactive.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[tokio::test]
    async fn signup_conflicts_on_existing_email() {
        let existing = user_with_password("hunter2");
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));

        let usecase = AuthUseCase::new(Arc::new(user_repo), "secret".to_string(), 3600);
        let result = usecase.signup("u1@example.com", "hunter2").await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn signin_issues_a_decodable_token() {
        let user = user_with_password("hunter2");
        let user_id = user.id;

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let usecase = AuthUseCase::new(Arc::new(user_repo), "jwt-test-secret".to_string(), 3600);
        let response = usecase.signin("u1@example.com", "hunter2").await.unwrap();

        let decoded = decode::<AuthClaims>(
            &response.token,
            &DecodingKey::from_secret(b"jwt-test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, user_id.to_string());
    }

    #[tokio::test]
    async fn signin_rejects_wrong_password() {
        let user = user_with_password("hunter2");
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let usecase = AuthUseCase::new(Arc::new(user_repo), "secret".to_string(), 3600);
        let result = usecase.signin("u1@example.com", "wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}
