use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Job, Profile, Role};

/// Aggregate rating for a poster. Posters with no ratings get 0/0 rather
/// than null so rendering never has to branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
}

/// Poster display metadata attached to a search result.
#[derive(Debug, Clone, Serialize)]
pub struct PosterInfo {
    pub id: i64,
    pub display_name: String,
    pub company_name: Option<String>,
    pub nickname: Option<String>,
    pub photo_url: Option<String>,
}

/// A matched job with poster metadata and rating aggregates: a map-ready
/// marker. Constructed per response, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedJob {
    pub job: Job,
    pub poster: PosterInfo,
    pub rating: RatingSummary,
}

/// Joins matched jobs with poster profiles and rating aggregates. Pure
/// enrichment: the input job list is preserved in order and in full; a
/// missing profile row falls back to a placeholder rather than dropping the
/// job, because filtering decisions were already made upstream.
#[must_use]
pub fn enrich(
    jobs: Vec<Job>,
    posters: &HashMap<i64, Profile>,
    ratings: &HashMap<i64, RatingSummary>,
) -> Vec<EnrichedJob> {
    jobs.into_iter()
        .map(|job| {
            let rating = ratings.get(&job.poster_id).copied().unwrap_or_default();
            let poster = posters.get(&job.poster_id).map_or_else(
                || PosterInfo {
                    id: job.poster_id,
                    display_name: String::new(),
                    company_name: None,
                    nickname: None,
                    photo_url: None,
                },
                |profile| PosterInfo {
                    id: profile.id,
                    display_name: profile.display_name.clone(),
                    company_name: profile.company_name.clone(),
                    // Homeowners have no nickname field on the platform.
                    nickname: if profile.role == Role::Homeowner {
                        None
                    } else {
                        profile.nickname.clone()
                    },
                    photo_url: profile.photo_url.clone(),
                },
            );

            EnrichedJob { job, poster, rating }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PosterKind, SalaryPeriod};

    fn job(id: i64, poster_id: i64) -> Job {
        Job {
            id,
            title: format!("Job {id}"),
            description: String::new(),
            location: "Bristol".to_string(),
            latitude: None,
            longitude: None,
            salary_min: None,
            salary_max: None,
            salary_period: SalaryPeriod::PerYear,
            annual_min: None,
            annual_max: None,
            job_type: "full_time".to_string(),
            experience_level: "entry".to_string(),
            no_experience_required: false,
            training_provided: false,
            tradespeople_job: false,
            is_active: true,
            expires_at: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            poster_id,
            poster_kind: PosterKind::Company,
        }
    }

    fn profile(id: i64, role: Role, nickname: Option<&str>) -> Profile {
        Profile {
            id,
            role,
            display_name: format!("Poster {id}"),
            company_name: None,
            nickname: nickname.map(String::from),
            photo_url: Some(format!("/photos/{id}.jpg")),
            location: None,
            banned: false,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn missing_rating_defaults_to_zeroes() {
        let posters = HashMap::from([(7, profile(7, Role::Employer, None))]);
        let enriched = enrich(vec![job(1, 7)], &posters, &HashMap::new());

        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].rating, RatingSummary { average: 0.0, count: 0 });
    }

    #[test]
    fn homeowner_nickname_is_always_absent() {
        let posters = HashMap::from([
            (1, profile(1, Role::Homeowner, Some("hank"))),
            (2, profile(2, Role::Employer, Some("acme"))),
        ]);
        let enriched = enrich(vec![job(10, 1), job(11, 2)], &posters, &HashMap::new());

        assert_eq!(enriched[0].poster.nickname, None);
        assert_eq!(enriched[1].poster.nickname.as_deref(), Some("acme"));
    }

    #[test]
    fn enrichment_preserves_order_and_count() {
        let posters = HashMap::new();
        let ratings = HashMap::from([(5, RatingSummary { average: 4.5, count: 12 })]);
        let enriched = enrich(vec![job(3, 5), job(1, 5), job(2, 9)], &posters, &ratings);

        let ids: Vec<i64> = enriched.iter().map(|e| e.job.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(enriched[0].rating.count, 12);
        assert_eq!(enriched[2].rating.count, 0);
    }
}
