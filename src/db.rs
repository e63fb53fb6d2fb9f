use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::config::AppConfig;

/// Columns guarded by a unique constraint on `users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::Username => "username",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {}", .0.as_str())]
    Duplicate(UniqueField),

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = e {
            return StoreError::NotFound;
        }
        // 23505 = unique_violation
        let duplicate = match &e {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                match db_err.constraint() {
                    Some("users_email_key") => Some(UniqueField::Email),
                    Some("users_username_key") => Some(UniqueField::Username),
                    _ => None,
                }
            }
            _ => None,
        };
        match duplicate {
            Some(field) => StoreError::Duplicate(field),
            None => StoreError::Database(e),
        }
    }
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        tracing::warn!(error = %e, "migrations failed; continuing");
    }

    Ok(db)
}
