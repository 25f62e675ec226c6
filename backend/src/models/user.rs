//! Models for user accounts and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a registered account.
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,
    /// Email address used for login; unique across accounts.
    pub email: String,
    /// Argon2 hash of the user's password.
    pub password_hash: String,
    /// Human-readable full name.
    pub full_name: String,
    /// Cleared on soft-delete; inactive users cannot authenticate.
    pub is_active: bool,
    /// Grants access to admin-scoped endpoints.
    pub is_superuser: bool,
    pub is_verified: bool,
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Constructs a registration-state user with a fresh identifier.
    pub fn new(email: String, password_hash: String, full_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            full_name,
            is_active: true,
            is_superuser: false,
            is_verified: false,
            registered_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Payload for creating a new account.
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub full_name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
/// Form-encoded credentials, OAuth2 password-flow field names.
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Self-scope profile update. Cannot touch privilege flags.
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
/// Admin-scope update; may additionally alter privilege flags.
pub struct AdminUpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of a user.
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Access token returned from login/refresh; the refresh token itself
/// only travels in the cookie.
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
