/// Account endpoints
///
/// # Endpoints
///
/// - `POST /v1/users` - Sign up
/// - `POST /v1/users/login` - Log in and get a bearer token
/// - `PATCH /v1/users/password` - Change password (authenticated)
/// - `DELETE /v1/users` - Delete the caller's account (authenticated)

use crate::{
    app::{AppState, BearerToken},
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use mentordesk_shared::auth::password;
use mentordesk_shared::models::user::NewUser;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address, unique across accounts
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Username, unique across accounts
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,

    /// Password (validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Given name
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    /// Family name
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
}

/// Signup response
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    /// New user ID
    pub user_id: String,

    /// Bearer token for subsequent requests
    pub token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: String,

    /// Bearer token
    pub token: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password, re-checked before the change applies
    pub current_password: String,

    /// Replacement password (validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Sign up a new account
///
/// The password is hashed with Argon2id before anything is persisted; the
/// plaintext never leaves this handler. Duplicate email or username yields
/// `409 Conflict`.
///
/// # Errors
///
/// - `409 Conflict`: Email or username already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    password::validate_password_strength(&req.password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    // Early duplicate checks give precise messages; the store's unique
    // constraints still back them up under races.
    if state.creds.find_by_email(&req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }
    if state.creds.find_by_username(&req.username).await?.is_some() {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = state
        .creds
        .create(NewUser {
            email: req.email,
            username: req.username,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    let token = state.tokens.issue(&user)?;

    tracing::info!(user_id = %user.id, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: user.id.to_string(),
            token,
        }),
    ))
}

/// Log in with email and password
///
/// An unknown email is reported as `404 Not Found` so clients can steer the
/// user toward signup; a wrong password for a known account is `401`.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = state
        .creds
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account for this email".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    let token = state.tokens.issue(&user)?;

    tracing::info!(user_id = %user.id, "Login");

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        token,
    }))
}

/// Change the caller's password
///
/// Requires a valid bearer token and the current password.
pub async fn change_password(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    let user = state.tokens.verify(&token).await?;

    req.validate().map_err(ApiError::from_validation)?;

    let valid = password::verify_password(&req.current_password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    password::validate_password_strength(&req.new_password)
        .map_err(|e| ApiError::invalid_field("new_password", e))?;

    let new_hash = password::hash_password(&req.new_password)?;

    let changed = state.creds.change_secret(user.id, &new_hash).await?;
    if !changed {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}

/// Delete the caller's account
///
/// The profile goes with it; tasks survive with `created_by` cleared.
/// Because token verification re-resolves the subject on every request,
/// the caller's outstanding tokens stop working the moment this returns.
pub async fn delete_account(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<StatusCode> {
    let user = state.tokens.verify(&token).await?;

    state.profiles.delete_by_user(user.id).await?;

    let removed = state.creds.delete(user.id).await?;
    if !removed {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user.id, "Account deleted");

    Ok(StatusCode::NO_CONTENT)
}
