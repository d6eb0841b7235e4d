/// Profile endpoints
///
/// A profile is an aggregate: the profile row, exactly one location, and any
/// number of social links. Creation persists all three atomically and the
/// response echoes the stored aggregate.
///
/// # Endpoints
///
/// - `POST /v1/profiles` - Create the caller's profile
/// - `GET /v1/profiles/me` - Fetch the caller's profile
/// - `POST /v1/profiles/social-links` - Attach a social link
/// - `DELETE /v1/profiles/social-links/:id` - Detach a social link

use crate::{
    app::{AppState, BearerToken},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mentordesk_shared::models::profile::{NewProfile, NewSocialLink, Profile, SocialLink};
use uuid::Uuid;

/// Create the caller's profile
///
/// One profile per user; a second create yields `409 Conflict`.
pub async fn create_profile(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<NewProfile>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    let user = state.tokens.verify(&token).await?;

    if state.profiles.find_by_user(user.id).await?.is_some() {
        return Err(ApiError::Conflict("Profile already exists".to_string()));
    }

    let profile = state.profiles.create(user.id, req).await?;

    tracing::info!(user_id = %user.id, profile_id = %profile.id, "Profile created");

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Fetch the caller's own profile
pub async fn get_own_profile(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<Profile>> {
    let user = state.tokens.verify(&token).await?;

    let profile = state
        .profiles
        .find_by_user(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Attach a social link to the caller's profile
pub async fn add_social_link(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<NewSocialLink>,
) -> ApiResult<(StatusCode, Json<SocialLink>)> {
    let user = state.tokens.verify(&token).await?;

    let profile = state
        .profiles
        .find_by_user(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    let link = state.profiles.add_social_link(profile.id, req).await?;

    Ok((StatusCode::CREATED, Json(link)))
}

/// Detach a social link from the caller's profile
///
/// The link must belong to the caller's own profile; IDs on other profiles
/// read as `404`.
pub async fn remove_social_link(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(link_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let user = state.tokens.verify(&token).await?;

    let profile = state
        .profiles
        .find_by_user(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    let removed = state
        .profiles
        .remove_social_link(profile.id, link_id)
        .await?;
    if !removed {
        return Err(ApiError::NotFound("Social link not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
