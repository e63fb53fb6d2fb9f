use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};

use crate::{
    contact::{
        dto::{ContactCreated, ContactFailure, ContactRequest, StatusMessage},
        services,
    },
    error::{AppError, FieldErrors},
    state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/test/", get(test_api))
        .route("/contact/", post(contact_create))
}

pub async fn test_api() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: "API is working!",
        status: "success",
    })
}

#[instrument(skip(state, payload))]
pub async fn contact_create(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactCreated>), (StatusCode, Json<ContactFailure>)> {
    let result = match payload {
        Ok(Json(req)) => services::submit(&*state.contacts, req).await,
        Err(rejection) => Err(AppError::from(rejection)),
    };

    match result {
        Ok(data) => Ok((
            StatusCode::CREATED,
            Json(ContactCreated {
                message: "Message sent successfully!",
                status: "success",
                data,
            }),
        )),
        Err(e) => Err(contact_failure(e)),
    }
}

fn contact_failure(e: AppError) -> (StatusCode, Json<ContactFailure>) {
    match e {
        AppError::Validation(fields) | AppError::Conflict(fields) => {
            warn!(errors = ?fields, "contact form rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(ContactFailure {
                    message: "Invalid data",
                    status: "error",
                    errors: Some(fields),
                    error: None,
                }),
            )
        }
        AppError::Auth(failure) => (
            StatusCode::BAD_REQUEST,
            Json(ContactFailure {
                message: "Invalid data",
                status: "error",
                errors: Some(FieldErrors::single("non_field_errors", failure.detail())),
                error: None,
            }),
        ),
        AppError::Internal(e) => {
            error!(error = ?e, "error processing contact form submission");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContactFailure {
                    message: "An error occurred while processing your request",
                    status: "error",
                    errors: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
