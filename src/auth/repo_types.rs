use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    pub phone_number: String,
    pub address: String,
    pub is_farmer: bool,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated registration, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub phone_number: String,
    pub address: String,
    pub is_farmer: bool,
}

/// Profile fields to overwrite; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub is_farmer: Option<bool>,
}
