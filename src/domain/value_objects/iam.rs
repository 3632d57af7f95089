use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub subscription_active: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SigninResponseDto {
    pub user: UserDto,
    pub token: String,
}
