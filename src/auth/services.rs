use anyhow::Context;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        dto::{
            LoginRequest, LoginResponse, ProfileUpdate, PublicUser, RefreshRequest,
            RefreshResponse, RegisterRequest,
        },
        jwt::JwtKeys,
        password::{hash_password, verify_dummy, verify_password},
        repo::UserRepository,
        repo_types::{NewUser, User, UserChanges},
        validation::{self, check_password, is_valid_username, normalize_email, required},
    },
    config::PasswordPolicy,
    db::{StoreError, UniqueField},
    error::{AppError, AuthFailure, FieldErrors},
};

pub const PASSWORD_MISMATCH: &str =
    "Password fields didn't match. Please make sure both passwords are the same.";
pub const REGISTER_EMAIL_TAKEN: &str =
    "A user with this email already exists. Please use a different email address.";
pub const REGISTER_USERNAME_TAKEN: &str =
    "A user with this username already exists. Please choose a different username.";
pub const PROFILE_EMAIL_TAKEN: &str = "user with this email already exists.";
pub const PROFILE_USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Validates a registration payload and inserts exactly one user.
///
/// Field-level problems are collected across all fields first. After that
/// the cross-field checks run in order and stop at the first failure:
/// password confirmation, email uniqueness, username uniqueness. Nothing is
/// written unless every check passes.
pub async fn register_user(
    users: &dyn UserRepository,
    policy: &PasswordPolicy,
    mut req: RegisterRequest,
) -> Result<User, AppError> {
    trim_opt(&mut req.email);
    trim_opt(&mut req.username);

    let mut errors = match req.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => e.into(),
    };

    let email = required(&mut errors, "email", req.email.as_deref()).map(normalize_email);
    let username = required(&mut errors, "username", req.username.as_deref()).map(str::to_owned);
    let password = required_raw(&mut errors, "password", req.password.as_deref());
    let password2 = required_raw(&mut errors, "password2", req.password2.as_deref());

    if let Some(u) = username.as_deref() {
        if !errors.contains("username") && !is_valid_username(u) {
            errors.add("username", validation::INVALID_USERNAME);
        }
    }
    if let Some(p) = password {
        for msg in check_password(policy, p) {
            errors.add("password", msg);
        }
    }
    errors.into_result()?;

    // all four are present once field validation passed
    let (Some(email), Some(username), Some(password), Some(password2)) =
        (email, username, password, password2)
    else {
        return Err(anyhow::anyhow!("validated registration is missing a field").into());
    };

    if password != password2 {
        return Err(AppError::field("password", PASSWORD_MISMATCH));
    }
    if users.email_taken(&email, None).await.map_err(store_error)? {
        return Err(AppError::conflict("email", REGISTER_EMAIL_TAKEN));
    }
    if users.username_taken(&username, None).await.map_err(store_error)? {
        return Err(AppError::conflict("username", REGISTER_USERNAME_TAKEN));
    }

    let password_hash = hash_password(password).context("hash password")?;
    let new = NewUser {
        email,
        username,
        password_hash,
        phone_number: req.phone_number.unwrap_or_default(),
        address: req.address.unwrap_or_default(),
        is_farmer: req.is_farmer.unwrap_or(false),
    };

    let user = users.create(new).await.map_err(|e| match e {
        StoreError::Duplicate(UniqueField::Email) => {
            AppError::conflict("email", REGISTER_EMAIL_TAKEN)
        }
        StoreError::Duplicate(UniqueField::Username) => {
            AppError::conflict("username", REGISTER_USERNAME_TAKEN)
        }
        other => store_error(other),
    })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Email/password login returning a fresh token pair.
pub async fn authenticate(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let mut errors = FieldErrors::new();
    let email = required(&mut errors, "email", req.email.as_deref()).map(normalize_email);
    let password = required_raw(&mut errors, "password", req.password.as_deref());
    errors.into_result()?;
    let (Some(email), Some(password)) = (email, password) else {
        return Err(AppError::Auth(AuthFailure::NoActiveAccount));
    };

    let Some(user) = users.find_by_email(&email).await.map_err(store_error)? else {
        verify_dummy(password);
        warn!(email = %email, "login unknown email");
        return Err(AppError::Auth(AuthFailure::NoActiveAccount));
    };

    if !verify_password(password, &user.password_hash).context("verify password")? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Auth(AuthFailure::NoActiveAccount));
    }
    if !user.is_active {
        warn!(user_id = %user.id, "login inactive account");
        return Err(AppError::Auth(AuthFailure::NoActiveAccount));
    }

    let access = keys.sign_access(user.id).context("sign access token")?;
    let refresh = keys.sign_refresh(user.id).context("sign refresh token")?;

    info!(user_id = %user.id, "user logged in");
    Ok(LoginResponse {
        refresh,
        access,
        user: user.into(),
    })
}

/// Exchanges a refresh token for a new access token.
pub async fn refresh_tokens(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    req: RefreshRequest,
) -> Result<RefreshResponse, AppError> {
    let mut errors = FieldErrors::new();
    let token = required_raw(&mut errors, "refresh", req.refresh.as_deref());
    errors.into_result()?;
    let Some(token) = token else {
        return Err(AppError::Auth(AuthFailure::TokenInvalid));
    };

    let claims = keys.verify_refresh(token).map_err(|e| {
        debug!(error = %e, "refresh token rejected");
        AppError::Auth(AuthFailure::TokenInvalid)
    })?;
    let user = load_active_user(users, claims.sub).await?;

    let access = keys.sign_access(user.id).context("sign access token")?;
    let refresh = if keys.rotate_refresh {
        Some(keys.sign_refresh(user.id).context("sign refresh token")?)
    } else {
        None
    };
    Ok(RefreshResponse { access, refresh })
}

/// Resolves a token subject to an existing, active user.
pub async fn load_active_user(users: &dyn UserRepository, id: Uuid) -> Result<User, AppError> {
    let user = users
        .find_by_id(id)
        .await
        .map_err(store_error)?
        .ok_or(AppError::Auth(AuthFailure::UserNotFound))?;
    if !user.is_active {
        return Err(AppError::Auth(AuthFailure::UserInactive));
    }
    Ok(user)
}

/// Applies a profile update to the caller's own row.
///
/// `partial` is true for PATCH; a full update (PUT) requires `email` and
/// `username`.
pub async fn update_profile(
    users: &dyn UserRepository,
    user_id: Uuid,
    mut req: ProfileUpdate,
    partial: bool,
) -> Result<PublicUser, AppError> {
    trim_opt(&mut req.email);
    trim_opt(&mut req.username);

    let mut errors = match req.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => e.into(),
    };

    let email = if partial && req.email.is_none() {
        None
    } else {
        required(&mut errors, "email", req.email.as_deref()).map(normalize_email)
    };
    let username = if partial && req.username.is_none() {
        None
    } else {
        required(&mut errors, "username", req.username.as_deref()).map(str::to_owned)
    };
    if let Some(u) = username.as_deref() {
        if !errors.contains("username") && !is_valid_username(u) {
            errors.add("username", validation::INVALID_USERNAME);
        }
    }

    if !errors.contains("email") {
        if let Some(e) = email.as_deref() {
            if users.email_taken(e, Some(user_id)).await.map_err(store_error)? {
                errors.add("email", PROFILE_EMAIL_TAKEN);
            }
        }
    }
    if !errors.contains("username") {
        if let Some(u) = username.as_deref() {
            if users.username_taken(u, Some(user_id)).await.map_err(store_error)? {
                errors.add("username", PROFILE_USERNAME_TAKEN);
            }
        }
    }
    errors.into_result()?;

    let changes = UserChanges {
        email,
        username,
        phone_number: req.phone_number,
        address: req.address,
        is_farmer: req.is_farmer,
    };
    let user = users.update(user_id, changes).await.map_err(|e| match e {
        StoreError::Duplicate(UniqueField::Email) => {
            AppError::conflict("email", PROFILE_EMAIL_TAKEN)
        }
        StoreError::Duplicate(UniqueField::Username) => {
            AppError::conflict("username", PROFILE_USERNAME_TAKEN)
        }
        StoreError::NotFound => AppError::Auth(AuthFailure::UserNotFound),
        other => store_error(other),
    })?;

    info!(user_id = %user.id, "profile updated");
    Ok(user.into())
}

fn store_error(e: StoreError) -> AppError {
    AppError::Internal(anyhow::Error::new(e).context("user store"))
}

fn trim_opt(value: &mut Option<String>) {
    if let Some(v) = value {
        let trimmed = v.trim();
        if trimmed.len() != v.len() {
            *v = trimmed.to_string();
        }
    }
}

/// Like `required`, but keeps the value verbatim (passwords and tokens).
fn required_raw<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value {
        None => {
            errors.replace(field, validation::REQUIRED);
            None
        }
        Some("") => {
            errors.replace(field, validation::BLANK);
            None
        }
        Some(v) => Some(v),
    }
}
