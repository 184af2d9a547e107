use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, LogDto, LogResponse, ReportDto};
use crate::api::validation::validate_id;
use crate::constants::limits::DEFAULT_LOG_PAGE_SIZE;
use crate::entities::reports;
use crate::services::AdminStats;

#[derive(Deserialize)]
pub struct ReportRequest {
    pub reported_id: i64,
    pub reason: String,
}

#[derive(Deserialize)]
pub struct CloseReportRequest {
    pub resolution: Option<String>,
}

#[derive(Deserialize)]
pub struct ReportListQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct LogQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub level: Option<String>,
    pub event_type: Option<String>,
}

fn to_dto(model: reports::Model) -> ReportDto {
    ReportDto {
        id: model.id,
        reporter_id: model.reporter_id,
        reported_id: model.reported_id,
        reason: model.reason,
        status: model.status,
        resolution: model.resolution,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Any authenticated profile may file a report; the admin workflow below
/// picks it up.
pub async fn file_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    let reporter_id = user.require_profile()?;
    validate_id(request.reported_id, "profile")?;

    let report = state
        .moderation_service()
        .file_report(reporter_id, request.reported_id, &request.reason)
        .await?;

    Ok(Json(ApiResponse::success(to_dto(report))))
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<ApiResponse<Vec<ReportDto>>>, ApiError> {
    let reports = state
        .moderation_service()
        .list_reports(query.status.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(
        reports.into_iter().map(to_dto).collect(),
    )))
}

pub async fn resolve_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<CloseReportRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "report")?;

    state
        .moderation_service()
        .resolve_report(id, request.resolution.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(())))
}

pub async fn dismiss_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<CloseReportRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "report")?;

    state
        .moderation_service()
        .dismiss_report(id, request.resolution.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(())))
}

pub async fn ban_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "profile")?;
    state.moderation_service().ban(id).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn unban_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "profile")?;
    state.moderation_service().unban(id).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AdminStats>>, ApiError> {
    let stats = state.stats_service().admin_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> Result<Json<ApiResponse<LogResponse>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_LOG_PAGE_SIZE).clamp(1, 500);

    let (logs, total_pages) = state
        .store()
        .get_logs(page, page_size, query.level, query.event_type)
        .await?;

    Ok(Json(ApiResponse::success(LogResponse {
        logs: logs
            .into_iter()
            .map(|l| LogDto {
                id: l.id,
                event_type: l.event_type,
                level: l.level,
                message: l.message,
                details: l.details,
                created_at: l.created_at,
            })
            .collect(),
        total_pages,
    })))
}

pub async fn clear_logs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store().clear_logs().await?;
    Ok(Json(ApiResponse::success(())))
}
