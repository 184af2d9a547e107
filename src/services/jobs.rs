use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};
use tracing::info;

use crate::config::Config;
use crate::constants::limits::{MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::models::{Job, PosterKind, Profile, SalaryPeriod};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job {0} not found")]
    NotFound(i64),

    #[error("Only the poster may modify this job")]
    NotOwner,

    #[error("Role '{0}' cannot post jobs")]
    NotAPoster(String),

    #[error("Banned accounts cannot post jobs")]
    Banned,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Poster-supplied fields of a posting. Expiry is optional; an absent value
/// gets the configured default listing window.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_period: SalaryPeriod,
    pub job_type: String,
    pub experience_level: String,
    pub no_experience_required: bool,
    pub training_provided: bool,
    pub tradespeople_job: bool,
    pub expires_at: Option<String>,
}

/// Job lifecycle: create, edit, extend, deactivate, delete. Every write
/// recomputes the annual-equivalent salary columns the search core compares
/// against.
pub struct JobService {
    store: Store,
    config: Arc<RwLock<Config>>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl JobService {
    #[must_use]
    pub const fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            config,
            event_bus,
        }
    }

    pub async fn create(&self, poster: &Profile, input: NewJob) -> Result<Job, JobError> {
        if poster.banned {
            return Err(JobError::Banned);
        }

        let Some(poster_kind) = poster.role.poster_kind() else {
            return Err(JobError::NotAPoster(poster.role.to_string()));
        };

        validate_input(&input)?;

        let now = Utc::now();
        let expires_at = match input.expires_at.clone() {
            Some(explicit) => Some(explicit),
            None => {
                let days = self.config.read().await.jobs.default_listing_days;
                Some((now + Duration::days(days)).to_rfc3339())
            }
        };

        let (annual_min, annual_max) = annual_bounds(&input);

        let job = Job {
            id: 0,
            title: input.title,
            description: input.description,
            location: input.location,
            latitude: input.latitude,
            longitude: input.longitude,
            salary_min: input.salary_min,
            salary_max: input.salary_max,
            salary_period: input.salary_period,
            annual_min,
            annual_max,
            job_type: input.job_type,
            experience_level: input.experience_level,
            no_experience_required: input.no_experience_required,
            training_provided: input.training_provided,
            tradespeople_job: input.tradespeople_job || poster_kind == PosterKind::Homeowner,
            is_active: true,
            expires_at,
            created_at: now.to_rfc3339(),
            poster_id: poster.id,
            poster_kind,
        };

        let created = self.store.create_job(&job).await?;

        let _ = self.event_bus.send(NotificationEvent::JobPosted {
            job_id: created.id,
            title: created.title.clone(),
        });

        Ok(created)
    }

    pub async fn update(
        &self,
        job_id: i64,
        poster_id: i64,
        input: NewJob,
    ) -> Result<Job, JobError> {
        let mut updated = self.owned_job(job_id, poster_id).await?;

        validate_input(&input)?;

        let (annual_min, annual_max) = annual_bounds(&input);

        updated.title = input.title;
        updated.description = input.description;
        updated.location = input.location;
        updated.latitude = input.latitude;
        updated.longitude = input.longitude;
        updated.salary_min = input.salary_min;
        updated.salary_max = input.salary_max;
        updated.salary_period = input.salary_period;
        updated.annual_min = annual_min;
        updated.annual_max = annual_max;
        updated.job_type = input.job_type;
        updated.experience_level = input.experience_level;
        updated.no_experience_required = input.no_experience_required;
        updated.training_provided = input.training_provided;
        updated.tradespeople_job = input.tradespeople_job;
        if let Some(expires_at) = input.expires_at {
            updated.expires_at = Some(expires_at);
        }

        self.store.update_job(&updated).await?;
        Ok(updated)
    }

    /// Pushes the expiry forward by the configured extension window, from
    /// the later of now and the current expiry.
    pub async fn extend(&self, job_id: i64, poster_id: i64) -> Result<Job, JobError> {
        let mut job = self.owned_job(job_id, poster_id).await?;

        let days = self.config.read().await.jobs.extension_days;
        let now = Utc::now().to_rfc3339();

        let base = match &job.expires_at {
            Some(current) if current > &now => current.clone(),
            _ => now,
        };
        let base_time = chrono::DateTime::parse_from_rfc3339(&base)
            .map_err(|e| JobError::Validation(format!("Stored expiry is malformed: {e}")))?;
        let extended = (base_time + Duration::days(days)).to_rfc3339();

        self.store.set_job_expiry(job_id, Some(&extended)).await?;
        job.expires_at = Some(extended.clone());

        let _ = self.event_bus.send(NotificationEvent::JobExtended {
            job_id,
            expires_at: extended,
        });

        Ok(job)
    }

    pub async fn deactivate(&self, job_id: i64, poster_id: i64) -> Result<(), JobError> {
        let job = self.owned_job(job_id, poster_id).await?;

        self.store.set_job_active(job_id, false).await?;
        info!(job_id, "Job deactivated");

        let _ = self.event_bus.send(NotificationEvent::JobDeactivated {
            job_id,
            title: job.title,
        });

        Ok(())
    }

    /// Deletes a posting outright. Admins may delete any job; posters only
    /// their own.
    pub async fn delete(
        &self,
        job_id: i64,
        poster_id: i64,
        is_admin: bool,
    ) -> Result<(), JobError> {
        if is_admin {
            if !self.store.remove_job(job_id).await? {
                return Err(JobError::NotFound(job_id));
            }
            return Ok(());
        }

        self.owned_job(job_id, poster_id).await?;
        self.store.remove_job(job_id).await?;
        Ok(())
    }

    async fn owned_job(&self, job_id: i64, poster_id: i64) -> Result<Job, JobError> {
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or(JobError::NotFound(job_id))?;

        if job.poster_id != poster_id {
            return Err(JobError::NotOwner);
        }

        Ok(job)
    }
}

fn annual_bounds(input: &NewJob) -> (Option<f64>, Option<f64>) {
    (
        input.salary_min.map(|v| input.salary_period.to_annual(v)),
        input.salary_max.map(|v| input.salary_period.to_annual(v)),
    )
}

fn validate_input(input: &NewJob) -> Result<(), JobError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(JobError::Validation("Job title cannot be empty".to_string()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(JobError::Validation(format!(
            "Job title must be {MAX_TITLE_LEN} characters or less"
        )));
    }

    if input.description.len() > MAX_DESCRIPTION_LEN {
        return Err(JobError::Validation(format!(
            "Job description must be {MAX_DESCRIPTION_LEN} characters or less"
        )));
    }

    if let (Some(min), Some(max)) = (input.salary_min, input.salary_max)
        && min > max
    {
        return Err(JobError::Validation(
            "Minimum salary cannot exceed maximum salary".to_string(),
        ));
    }

    if input.latitude.is_some() != input.longitude.is_some() {
        return Err(JobError::Validation(
            "Latitude and longitude must be supplied together".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewJob {
        NewJob {
            title: "Bathroom refit".to_string(),
            description: "Full refit of a small bathroom".to_string(),
            location: "Leeds, UK".to_string(),
            latitude: Some(53.8),
            longitude: Some(-1.55),
            salary_min: Some(200.0),
            salary_max: Some(250.0),
            salary_period: SalaryPeriod::PerDay,
            job_type: "contract".to_string(),
            experience_level: "mid".to_string(),
            no_experience_required: false,
            training_provided: false,
            tradespeople_job: true,
            expires_at: None,
        }
    }

    #[test]
    fn annual_bounds_follow_the_period() {
        let (min, max) = annual_bounds(&input());
        assert_eq!(min, Some(52000.0));
        assert_eq!(max, Some(65000.0));
    }

    #[test]
    fn validation_rejects_inverted_salary_range() {
        let mut bad = input();
        bad.salary_min = Some(300.0);
        bad.salary_max = Some(200.0);
        assert!(matches!(validate_input(&bad), Err(JobError::Validation(_))));
    }

    #[test]
    fn validation_rejects_lone_coordinate() {
        let mut bad = input();
        bad.longitude = None;
        assert!(matches!(validate_input(&bad), Err(JobError::Validation(_))));
    }

    #[test]
    fn validation_rejects_blank_title() {
        let mut bad = input();
        bad.title = "   ".to_string();
        assert!(matches!(validate_input(&bad), Err(JobError::Validation(_))));
    }
}
