use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, RatingDto};
use crate::api::validation::{validate_id, validate_stars};

#[derive(Deserialize)]
pub struct RateRequest {
    pub stars: i32,
    pub comment: Option<String>,
}

/// Rates a poster. One rating per rater and poster; rating again replaces
/// the previous one.
pub async fn rate_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(request): Json<RateRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "profile")?;
    validate_stars(request.stars)?;
    let rater_id = user.require_profile()?;

    if rater_id == id {
        return Err(ApiError::validation("You cannot rate yourself"));
    }

    if state.store().get_profile(id).await?.is_none() {
        return Err(ApiError::not_found("Profile", id));
    }

    let now = chrono::Utc::now().to_rfc3339();
    state
        .store()
        .rate_profile(id, rater_id, request.stars, request.comment.as_deref(), &now)
        .await?;

    Ok(Json(ApiResponse::success(())))
}

pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<RatingDto>>>, ApiError> {
    validate_id(id, "profile")?;

    let ratings = state.store().list_ratings_for(id).await?;

    Ok(Json(ApiResponse::success(
        ratings
            .into_iter()
            .map(|r| RatingDto {
                id: r.id,
                rater_id: r.rater_id,
                stars: r.stars,
                comment: r.comment,
                created_at: r.created_at,
            })
            .collect(),
    )))
}
