use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::salary;

/// Pay frequency attached to a salary figure. Every frequency has a fixed
/// multiplier to an annual baseline so bounds stated in different units can
/// be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryPeriod {
    PerHour,
    PerDay,
    PerWeek,
    PerMonth,
    #[default]
    PerYear,
}

impl SalaryPeriod {
    #[must_use]
    pub const fn annual_multiplier(self) -> f64 {
        match self {
            Self::PerHour => salary::HOURS_PER_YEAR,
            Self::PerDay => salary::DAYS_PER_YEAR,
            Self::PerWeek => salary::WEEKS_PER_YEAR,
            Self::PerMonth => salary::MONTHS_PER_YEAR,
            Self::PerYear => 1.0,
        }
    }

    /// Converts an amount stated at this frequency to its annual equivalent.
    #[must_use]
    pub fn to_annual(self, amount: f64) -> f64 {
        amount * self.annual_multiplier()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerHour => "per_hour",
            Self::PerDay => "per_day",
            Self::PerWeek => "per_week",
            Self::PerMonth => "per_month",
            Self::PerYear => "per_year",
        }
    }
}

impl FromStr for SalaryPeriod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_hour" | "hour" | "hourly" => Ok(Self::PerHour),
            "per_day" | "day" | "daily" => Ok(Self::PerDay),
            "per_week" | "week" | "weekly" => Ok(Self::PerWeek),
            "per_month" | "month" | "monthly" => Ok(Self::PerMonth),
            "per_year" | "year" | "annual" | "yearly" => Ok(Self::PerYear),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SalaryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of account that posted a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosterKind {
    Company,
    Homeowner,
}

impl PosterKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Homeowner => "homeowner",
        }
    }
}

impl FromStr for PosterKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "company" => Ok(Self::Company),
            "homeowner" => Ok(Self::Homeowner),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PosterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One job posting.
///
/// A job is visible in search only while `is_active` is true and `expires_at`
/// is unset or in the future. Expiry is logical; rows are deleted only by an
/// explicit poster or admin action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_period: SalaryPeriod,
    /// Annual-equivalent bounds, precomputed at write time so search can
    /// compare salaries across frequencies without recomputation.
    pub annual_min: Option<f64>,
    pub annual_max: Option<f64>,
    pub job_type: String,
    pub experience_level: String,
    pub no_experience_required: bool,
    pub training_provided: bool,
    pub tradespeople_job: bool,
    pub is_active: bool,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub poster_id: i64,
    pub poster_kind: PosterKind,
}

impl Job {
    /// Whether the posting is currently visible, judged against an RFC 3339
    /// UTC timestamp.
    #[must_use]
    pub fn is_visible_at(&self, now: &str) -> bool {
        self.is_active && self.expires_at.as_deref().is_none_or(|e| e > now)
    }

    /// Annual-equivalent salary bounds recomputed from the raw figures.
    /// Used by the search fallback path when the precomputed columns cannot
    /// be queried.
    #[must_use]
    pub fn recomputed_annual_bounds(&self) -> (Option<f64>, Option<f64>) {
        (
            self.salary_min.map(|v| self.salary_period.to_annual(v)),
            self.salary_max.map(|v| self.salary_period.to_annual(v)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annual_multipliers() {
        assert_eq!(SalaryPeriod::PerHour.annual_multiplier(), 2080.0);
        assert_eq!(SalaryPeriod::PerDay.annual_multiplier(), 260.0);
        assert_eq!(SalaryPeriod::PerWeek.annual_multiplier(), 52.0);
        assert_eq!(SalaryPeriod::PerMonth.annual_multiplier(), 12.0);
        assert_eq!(SalaryPeriod::PerYear.annual_multiplier(), 1.0);
    }

    #[test]
    fn annual_conversion_round_trips() {
        for period in [
            SalaryPeriod::PerHour,
            SalaryPeriod::PerDay,
            SalaryPeriod::PerWeek,
            SalaryPeriod::PerMonth,
            SalaryPeriod::PerYear,
        ] {
            let original = 1234.56;
            let back = period.to_annual(original) / period.annual_multiplier();
            assert!((back - original).abs() < 1e-9, "{period} did not round-trip");
        }
    }

    #[test]
    fn monthly_salary_reaches_annual_boundary() {
        assert_eq!(SalaryPeriod::PerMonth.to_annual(2500.0), 30000.0);
    }

    #[test]
    fn period_parsing() {
        assert_eq!("per_month".parse(), Ok(SalaryPeriod::PerMonth));
        assert_eq!("hourly".parse(), Ok(SalaryPeriod::PerHour));
        assert!("fortnightly".parse::<SalaryPeriod>().is_err());
    }

    fn sample_job() -> Job {
        Job {
            id: 1,
            title: "Plumber".to_string(),
            description: "Fix a leaking tap".to_string(),
            location: "London, UK".to_string(),
            latitude: Some(51.5),
            longitude: Some(-0.12),
            salary_min: None,
            salary_max: Some(2500.0),
            salary_period: SalaryPeriod::PerMonth,
            annual_min: None,
            annual_max: Some(30000.0),
            job_type: "contract".to_string(),
            experience_level: "mid".to_string(),
            no_experience_required: false,
            training_provided: false,
            tradespeople_job: true,
            is_active: true,
            expires_at: Some("2030-01-01T00:00:00+00:00".to_string()),
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            poster_id: 7,
            poster_kind: PosterKind::Homeowner,
        }
    }

    #[test]
    fn visibility_honours_active_flag_and_expiry() {
        let now = "2026-06-01T00:00:00+00:00";

        let job = sample_job();
        assert!(job.is_visible_at(now));

        let mut inactive = sample_job();
        inactive.is_active = false;
        assert!(!inactive.is_visible_at(now));

        let mut expired = sample_job();
        expired.expires_at = Some("2026-01-02T00:00:00+00:00".to_string());
        assert!(!expired.is_visible_at(now));

        let mut open_ended = sample_job();
        open_ended.expires_at = None;
        assert!(open_ended.is_visible_at(now));
    }
}
