use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, SubscriptionDto};

#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub plan: String,
}

pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<ApiResponse<SubscriptionDto>>, ApiError> {
    let profile_id = user.require_profile()?;

    let subscription = state
        .billing_service()
        .subscribe(profile_id, &request.plan)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("Unknown plan") {
                ApiError::validation(msg)
            } else {
                ApiError::InternalError(msg)
            }
        })?;

    Ok(Json(ApiResponse::success(SubscriptionDto {
        plan: subscription.plan,
        status: subscription.status,
        started_at: subscription.started_at,
        expires_at: subscription.expires_at,
    })))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let profile_id = user.require_profile()?;

    if !state.billing_service().cancel(profile_id).await? {
        return Err(ApiError::NotFound(
            "No active subscription to cancel".to_string(),
        ));
    }

    Ok(Json(ApiResponse::success(())))
}

pub async fn current(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<SubscriptionDto>>, ApiError> {
    let profile_id = user.require_profile()?;

    let subscription = state
        .billing_service()
        .current_subscription(profile_id)
        .await?;

    let dto = match subscription {
        Some(sub) => SubscriptionDto {
            plan: sub.plan,
            status: sub.status,
            started_at: sub.started_at,
            expires_at: sub.expires_at,
        },
        // No subscription row reads as the free tier.
        None => SubscriptionDto {
            plan: "free".to_string(),
            status: "active".to_string(),
            started_at: String::new(),
            expires_at: None,
        },
    };

    Ok(Json(ApiResponse::success(dto)))
}
