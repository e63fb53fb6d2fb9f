use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::repo_types::User;
use crate::error::FieldErrors;

/// Request body for user registration.
///
/// Every field is optional at the parsing layer so a missing key becomes a
/// per-field error instead of a body rejection.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub username: Option<String>,
    pub password: Option<String>,
    pub password2: Option<String>,
    #[validate(length(max = 15, message = "Ensure this field has no more than 15 characters."))]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub is_farmer: Option<bool>,
}

/// Request body for login. `email` is the identifying field.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for token refresh.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Body of `PUT`/`PATCH /me/`. Unknown keys (including `id`) are ignored.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub username: Option<String>,
    #[validate(length(max = 15, message = "Ensure this field has no more than 15 characters."))]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub is_farmer: Option<bool>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub phone_number: String,
    pub address: String,
    pub is_farmer: bool,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            phone_number: u.phone_number,
            address: u.address,
            is_farmer: u.is_farmer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: PublicUser,
}

/// `error` is a field map for validation failures and a plain string otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RegisterErrorDetail {
    Fields(FieldErrors),
    Text(String),
}

#[derive(Debug, Serialize)]
pub struct RegisterFailure {
    pub message: &'static str,
    pub error: RegisterErrorDetail,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub refresh: String,
    pub access: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}
