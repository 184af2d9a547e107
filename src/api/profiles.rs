use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, ProfileDto, SignupResponse};
use crate::api::validation::{validate_id, validate_password, validate_username};
use crate::models::{Profile, Role};

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub role: String,
    pub display_name: String,
    pub company_name: Option<String>,
    pub nickname: Option<String>,
    pub photo_url: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    pub company_name: Option<String>,
    pub nickname: Option<String>,
    pub photo_url: Option<String>,
    pub location: Option<String>,
}

/// Multi-role signup: creates the auth account and the marketplace profile
/// in one transaction.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<ApiResponse<SignupResponse>>, ApiError> {
    validate_username(&request.username)?;
    validate_password(&request.password)?;

    let role: Role = request
        .role
        .parse()
        .map_err(|()| ApiError::validation(format!("Unknown role '{}'", request.role)))?;

    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::validation("Display name cannot be empty"));
    }

    let profile = Profile {
        id: 0,
        role,
        display_name: display_name.to_string(),
        company_name: request.company_name,
        // Homeowners never carry a nickname.
        nickname: if role == Role::Homeowner {
            None
        } else {
            request.nickname
        },
        photo_url: request.photo_url,
        location: request.location,
        banned: false,
        created_at: String::new(),
    };

    let security = state.config().read().await.security.clone();
    let (user, profile) = state
        .store()
        .create_account(&request.username, &request.password, &profile, &security)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("already taken") {
                ApiError::Conflict(msg)
            } else {
                ApiError::InternalError(msg)
            }
        })?;

    Ok(Json(ApiResponse::success(SignupResponse {
        username: user.username,
        profile_id: profile.id,
        api_key: user.api_key,
    })))
}

/// Public profile view with the rating aggregate attached.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    validate_id(id, "profile")?;

    let profile = state
        .store()
        .get_profile(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile", id))?;

    let rating = state.store().rating_summary_for(id).await?;

    Ok(Json(ApiResponse::success(ProfileDto::from_profile(
        profile, rating,
    ))))
}

pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let profile_id = user.require_profile()?;

    let mut profile = state
        .store()
        .get_profile(profile_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile", profile_id))?;

    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::validation("Display name cannot be empty"));
    }

    profile.display_name = display_name.to_string();
    profile.company_name = request.company_name;
    profile.nickname = if profile.role == Role::Homeowner {
        None
    } else {
        request.nickname
    };
    profile.photo_url = request.photo_url;
    profile.location = request.location;

    state.store().update_profile(&profile).await?;

    let rating = state.store().rating_summary_for(profile_id).await?;
    Ok(Json(ApiResponse::success(ProfileDto::from_profile(
        profile, rating,
    ))))
}
