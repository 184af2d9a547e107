use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::SESSION_PROFILE_KEY;
use super::{ApiResponse, AppState, JobMarkerDto, MapCenterDto, SearchResultsDto};
use crate::search::RawSearchParams;

/// The map-based job search endpoint. Public; a logged-in session only
/// matters for the saved-jobs filter. Never fails: the service degrades any
/// query-layer error to an empty result.
pub async fn search_jobs(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<RawSearchParams>,
) -> Json<ApiResponse<SearchResultsDto>> {
    let viewer = session
        .get::<i64>(SESSION_PROFILE_KEY)
        .await
        .ok()
        .flatten();

    let outcome = state.search_service().search(&params, viewer).await;

    let (lat, lng) = outcome.map_center;
    let results = SearchResultsDto {
        jobs: outcome.jobs.into_iter().map(JobMarkerDto::from).collect(),
        truncated: outcome.truncated,
        notice: outcome.notice,
        map_center: MapCenterDto { lat, lng },
    };

    Json(ApiResponse::success(results))
}
