use serde::{Deserialize, Serialize};

use crate::models::{Job, Profile};
use crate::search::{EnrichedJob, RatingSummary};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_period: String,
    pub job_type: String,
    pub experience_level: String,
    pub no_experience_required: bool,
    pub training_provided: bool,
    pub tradespeople_job: bool,
    pub is_active: bool,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub poster_id: i64,
    pub poster_kind: String,
}

impl From<Job> for JobDto {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            location: job.location,
            latitude: job.latitude,
            longitude: job.longitude,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            salary_period: job.salary_period.as_str().to_string(),
            job_type: job.job_type,
            experience_level: job.experience_level,
            no_experience_required: job.no_experience_required,
            training_provided: job.training_provided,
            tradespeople_job: job.tradespeople_job,
            is_active: job.is_active,
            expires_at: job.expires_at,
            created_at: job.created_at,
            poster_id: job.poster_id,
            poster_kind: job.poster_kind.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PosterDto {
    pub id: i64,
    pub display_name: String,
    pub company_name: Option<String>,
    pub nickname: Option<String>,
    pub photo_url: Option<String>,
    pub rating_average: f64,
    pub rating_count: i64,
}

/// One map-ready search marker.
#[derive(Debug, Serialize)]
pub struct JobMarkerDto {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_period: String,
    pub job_type: String,
    pub experience_level: String,
    pub tradespeople_job: bool,
    pub created_at: String,
    pub poster: PosterDto,
}

impl From<EnrichedJob> for JobMarkerDto {
    fn from(enriched: EnrichedJob) -> Self {
        let EnrichedJob { job, poster, rating } = enriched;
        Self {
            id: job.id,
            title: job.title,
            location: job.location,
            latitude: job.latitude,
            longitude: job.longitude,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            salary_period: job.salary_period.as_str().to_string(),
            job_type: job.job_type,
            experience_level: job.experience_level,
            tradespeople_job: job.tradespeople_job,
            created_at: job.created_at,
            poster: PosterDto {
                id: poster.id,
                display_name: poster.display_name,
                company_name: poster.company_name,
                nickname: poster.nickname,
                photo_url: poster.photo_url,
                rating_average: rating.average,
                rating_count: rating.count,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MapCenterDto {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct SearchResultsDto {
    pub jobs: Vec<JobMarkerDto>,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub map_center: MapCenterDto,
}

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub id: i64,
    pub role: String,
    pub display_name: String,
    pub company_name: Option<String>,
    pub nickname: Option<String>,
    pub photo_url: Option<String>,
    pub location: Option<String>,
    pub banned: bool,
    pub created_at: String,
    pub rating_average: f64,
    pub rating_count: i64,
}

impl ProfileDto {
    #[must_use]
    pub fn from_profile(profile: Profile, rating: RatingSummary) -> Self {
        Self {
            id: profile.id,
            role: profile.role.as_str().to_string(),
            display_name: profile.display_name,
            company_name: profile.company_name,
            nickname: profile.nickname,
            photo_url: profile.photo_url,
            location: profile.location,
            banned: profile.banned,
            created_at: profile.created_at,
            rating_average: rating.average,
            rating_count: rating.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RatingDto {
    pub id: i64,
    pub rater_id: i64,
    pub stars: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct InboxDto {
    pub messages: Vec<MessageDto>,
    pub unread: u64,
}

#[derive(Debug, Serialize)]
pub struct ReportDto {
    pub id: i64,
    pub reporter_id: i64,
    pub reported_id: i64,
    pub reason: String,
    pub status: String,
    pub resolution: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionDto {
    pub plan: String,
    pub status: String,
    pub started_at: String,
    pub expires_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub username: String,
    pub profile_id: i64,
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct LogDto {
    pub id: i64,
    pub event_type: String,
    pub level: String,
    pub message: String,
    pub details: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub logs: Vec<LogDto>,
    pub total_pages: u64,
}
