use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::api::validation::validate_password;
use crate::db::User;

pub const SESSION_USERNAME_KEY: &str = "username";
pub const SESSION_PROFILE_KEY: &str = "profile_id";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub api_key: String,
    pub is_admin: bool,
    pub profile_id: Option<i64>,
}

#[derive(Serialize)]
pub struct UserInfoResponse {
    pub username: String,
    pub is_admin: bool,
    pub profile_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

/// Authenticated identity attached to the request by the auth middleware.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
    pub profile_id: Option<i64>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            profile_id: user.profile_id,
        }
    }
}

impl CurrentUser {
    /// The marketplace profile behind this account; admin-only accounts
    /// have none.
    pub fn require_profile(&self) -> Result<i64, ApiError> {
        self.profile_id.ok_or_else(|| {
            ApiError::forbidden("This account has no marketplace profile")
        })
    }
}

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Ok(Some(username)) = session.get::<String>(SESSION_USERNAME_KEY).await
        && let Ok(Some(user)) = state.store().get_user_by_username(&username).await
    {
        tracing::Span::current().record("user_id", user.username.as_str());
        request.extensions_mut().insert(CurrentUser::from(user));
        return Ok(next.run(request).await);
    }

    if let Some(key) = extract_api_key(&headers)
        && let Ok(Some(user)) = state.store().verify_api_key(&key).await
    {
        tracing::Span::current().record("user_id", user.username.as_str());
        request.extensions_mut().insert(CurrentUser::from(user));
        return Ok(next.run(request).await);
    }

    Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response())
}

/// Gates the admin back-office; must run after [`auth_middleware`].
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(user) = request.extensions().get::<CurrentUser>() else {
        return Err(ApiError::Unauthorized("Authentication required".to_string()));
    };

    if !user.is_admin {
        return Err(ApiError::forbidden("Administrator access required"));
    }

    Ok(next.run(request).await)
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth) = headers.get("Authorization")
        && let Ok(auth_str) = auth.to_str()
        && let Some(key) = auth_str.strip_prefix("Bearer ")
    {
        return Some(key.to_string());
    }

    None
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let valid = state
        .store()
        .verify_user_password(&request.username, &request.password)
        .await
        .map_err(|e| ApiError::internal(format!("Login failed: {e}")))?;

    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let user = state
        .store()
        .get_user_by_username(&request.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    session
        .insert(SESSION_USERNAME_KEY, user.username.clone())
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
    if let Some(profile_id) = user.profile_id {
        session
            .insert(SESSION_PROFILE_KEY, profile_id)
            .await
            .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
    }

    tracing::info!(username = %user.username, "User logged in");

    Ok(Json(ApiResponse::success(LoginResponse {
        username: user.username,
        api_key: user.api_key,
        is_admin: user.is_admin,
        profile_id: user.profile_id,
    })))
}

pub async fn logout(session: Session) -> Result<Json<ApiResponse<()>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn me(
    axum::Extension(user): axum::Extension<CurrentUser>,
) -> Json<ApiResponse<UserInfoResponse>> {
    Json(ApiResponse::success(UserInfoResponse {
        username: user.username,
        is_admin: user.is_admin,
        profile_id: user.profile_id,
    }))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<CurrentUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_password(&request.new_password)?;

    let valid = state
        .store()
        .verify_user_password(&user.username, &request.current_password)
        .await?;

    if !valid {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let security = state.config().read().await.security.clone();
    state
        .store()
        .update_user_password(&user.username, &request.new_password, &security)
        .await?;

    Ok(Json(ApiResponse::success(())))
}

pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state.store().regenerate_user_api_key(&user.username).await?;
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}
