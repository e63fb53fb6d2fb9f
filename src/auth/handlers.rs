use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};

use crate::{
    auth::{
        dto::{
            LoginRequest, LoginResponse, ProfileUpdate, PublicUser, RefreshRequest,
            RefreshResponse, RegisterErrorDetail, RegisterFailure, RegisterRequest,
            RegisterResponse,
        },
        extractors::AuthUser,
        services,
    },
    error::{AppError, FieldErrors},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/token/refresh/", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me/", get(get_me).put(put_me).patch(patch_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), (StatusCode, Json<RegisterFailure>)> {
    let result = match payload {
        Ok(Json(req)) => services::register_user(&*state.users, &state.config.password, req).await,
        Err(rejection) => Err(AppError::from(rejection)),
    };

    match result {
        Ok(user) => Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                message: "User registered successfully",
                user: user.into(),
            }),
        )),
        Err(e) => Err(registration_failure(e)),
    }
}

fn registration_failure(e: AppError) -> (StatusCode, Json<RegisterFailure>) {
    let status = e.status();
    let error = match e {
        AppError::Validation(fields) | AppError::Conflict(fields) => {
            warn!(errors = ?fields, "registration rejected");
            RegisterErrorDetail::Fields(fields)
        }
        AppError::Auth(failure) => {
            RegisterErrorDetail::Fields(FieldErrors::single("non_field_errors", failure.detail()))
        }
        AppError::Internal(e) => {
            error!(error = ?e, "unexpected error during registration");
            RegisterErrorDetail::Text(e.to_string())
        }
    };
    (
        status,
        Json(RegisterFailure {
            message: "Registration failed",
            error,
        }),
    )
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;
    let res = services::authenticate(&*state.users, &state.jwt, req).await?;
    Ok(Json(res))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, AppError> {
    let Json(req) = payload?;
    let res = services::refresh_tokens(&*state.users, &state.jwt, req).await?;
    Ok(Json(res))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::load_active_user(&*state.users, user_id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn put_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<PublicUser>, AppError> {
    services::load_active_user(&*state.users, user_id).await?;
    let Json(req) = payload?;
    let user = services::update_profile(&*state.users, user_id, req, false).await?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn patch_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<PublicUser>, AppError> {
    services::load_active_user(&*state.users, user_id).await?;
    let Json(req) = payload?;
    let user = services::update_profile(&*state.users, user_id, req, true).await?;
    Ok(Json(user))
}
