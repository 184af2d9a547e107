use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, JobDto};
use crate::api::validation::validate_id;
use crate::models::SalaryPeriod;
use crate::services::NewJob;

#[derive(Deserialize)]
pub struct JobRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub salary_period: Option<String>,
    pub job_type: String,
    pub experience_level: String,
    #[serde(default)]
    pub no_experience_required: bool,
    #[serde(default)]
    pub training_provided: bool,
    #[serde(default)]
    pub tradespeople_job: bool,
    pub expires_at: Option<String>,
}

impl JobRequest {
    fn into_new_job(self) -> NewJob {
        NewJob {
            title: self.title,
            description: self.description,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            salary_period: self
                .salary_period
                .as_deref()
                .and_then(|p| p.parse::<SalaryPeriod>().ok())
                .unwrap_or_default(),
            job_type: self.job_type,
            experience_level: self.experience_level,
            no_experience_required: self.no_experience_required,
            training_provided: self.training_provided,
            tradespeople_job: self.tradespeople_job,
            expires_at: self.expires_at,
        }
    }
}

pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<JobRequest>,
) -> Result<Json<ApiResponse<JobDto>>, ApiError> {
    let profile_id = user.require_profile()?;

    let poster = state
        .store()
        .get_profile(profile_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile", profile_id))?;

    let job = state
        .job_service()
        .create(&poster, request.into_new_job())
        .await?;

    Ok(Json(ApiResponse::success(JobDto::from(job))))
}

/// Job detail. Invisible postings (deactivated or expired) are shown only
/// to their poster and to admins.
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<JobDto>>, ApiError> {
    validate_id(id, "job")?;

    let job = state
        .store()
        .get_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job", id))?;

    let now = chrono::Utc::now().to_rfc3339();
    if !job.is_visible_at(&now)
        && !user.is_admin
        && user.profile_id != Some(job.poster_id)
    {
        return Err(ApiError::not_found("Job", id));
    }

    Ok(Json(ApiResponse::success(JobDto::from(job))))
}

pub async fn update_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(request): Json<JobRequest>,
) -> Result<Json<ApiResponse<JobDto>>, ApiError> {
    validate_id(id, "job")?;
    let profile_id = user.require_profile()?;

    let job = state
        .job_service()
        .update(id, profile_id, request.into_new_job())
        .await?;

    Ok(Json(ApiResponse::success(JobDto::from(job))))
}

pub async fn extend_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<JobDto>>, ApiError> {
    validate_id(id, "job")?;
    let profile_id = user.require_profile()?;

    let job = state.job_service().extend(id, profile_id).await?;
    Ok(Json(ApiResponse::success(JobDto::from(job))))
}

pub async fn deactivate_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "job")?;
    let profile_id = user.require_profile()?;

    state.job_service().deactivate(id, profile_id).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "job")?;
    let profile_id = user.profile_id.unwrap_or(0);

    state
        .job_service()
        .delete(id, profile_id, user.is_admin)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn my_jobs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<JobDto>>>, ApiError> {
    let profile_id = user.require_profile()?;

    let jobs = state.store().list_jobs_for_poster(profile_id).await?;
    Ok(Json(ApiResponse::success(
        jobs.into_iter().map(JobDto::from).collect(),
    )))
}

pub async fn save_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "job")?;
    let profile_id = user.require_profile()?;

    if state.store().get_job(id).await?.is_none() {
        return Err(ApiError::not_found("Job", id));
    }

    let now = chrono::Utc::now().to_rfc3339();
    state.store().save_job(profile_id, id, &now).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn unsave_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "job")?;
    let profile_id = user.require_profile()?;

    state.store().unsave_job(profile_id, id).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn saved_jobs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<JobDto>>>, ApiError> {
    let profile_id = user.require_profile()?;

    let ids = state.store().saved_job_ids(profile_id).await?;
    let mut jobs = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(job) = state.store().get_job(id).await? {
            jobs.push(JobDto::from(job));
        }
    }

    Ok(Json(ApiResponse::success(jobs)))
}
