use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Per-field validation messages, serialized as `{"field": ["msg", ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Sets `field` to exactly one message.
    pub fn replace(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), vec![message.into()]);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for e in errs.iter() {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Authentication failures, each with a stable machine-readable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    NotAuthenticated,
    TokenInvalid,
    NoActiveAccount,
    UserNotFound,
    UserInactive,
}

impl AuthFailure {
    pub fn detail(self) -> &'static str {
        match self {
            AuthFailure::NotAuthenticated => "Authentication credentials were not provided.",
            AuthFailure::TokenInvalid => "Token is invalid or expired",
            AuthFailure::NoActiveAccount => "No active account found with the given credentials",
            AuthFailure::UserNotFound => "User not found",
            AuthFailure::UserInactive => "User is inactive",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            AuthFailure::NotAuthenticated => "not_authenticated",
            AuthFailure::TokenInvalid => "token_not_valid",
            AuthFailure::NoActiveAccount => "no_active_account",
            AuthFailure::UserNotFound => "user_not_found",
            AuthFailure::UserInactive => "user_inactive",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("conflict: {0:?}")]
    Conflict(FieldErrors),

    #[error("{}", .0.detail())]
    Auth(AuthFailure),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }

    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Conflict(FieldErrors::single(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Field errors for validation and conflict failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation(f) | AppError::Conflict(f) => Some(f),
            _ => None,
        }
    }
}

/// Unparseable bodies are reported as a 400 under `non_field_errors`.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "rejected request body");
        AppError::field("non_field_errors", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(fields) | AppError::Conflict(fields) => json!(fields),
            AppError::Auth(failure) => json!({
                "detail": failure.detail(),
                "code": failure.code(),
            }),
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                json!({ "detail": e.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
