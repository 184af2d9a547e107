use serde::Deserialize;

use crate::constants::search::{COORDINATE_PREFIX, DEFAULT_RADIUS_MILES, MILES_TO_KM};
use crate::models::SalaryPeriod;

/// Raw query parameters as they arrive on the search endpoint. Everything is
/// an optional string; absence means "no constraint", never "zero".
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawSearchParams {
    pub search: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub level: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    #[serde(rename = "salaryMin")]
    pub salary_min: Option<String>,
    #[serde(rename = "salaryMax")]
    pub salary_max: Option<String>,
    #[serde(rename = "salaryPeriod")]
    pub salary_period: Option<String>,
    pub saved: Option<String>,
    #[serde(rename = "trainingProvided")]
    pub training_provided: Option<String>,
    #[serde(rename = "noExperienceRequired")]
    pub no_experience_required: Option<String>,
}

/// Salary bounds normalized to an annual baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryBounds {
    pub min_annual: Option<f64>,
    pub max_annual: Option<f64>,
}

/// Resolved location constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationFilter {
    /// Coordinates are known; filtering uses a bounding box. When the
    /// location text was a place name (`from_coordinates` false) the primary
    /// token rescues jobs that lack coordinates via a text match. When the
    /// text itself was coordinate-derived there is no meaningful token and
    /// text matching is bypassed entirely.
    Geographic {
        lat: f64,
        lng: f64,
        radius_km: f64,
        from_coordinates: bool,
        primary_token: Option<String>,
    },
    /// No coordinates anywhere; substring match on the primary token alone.
    Text { primary_token: String },
}

/// Normalized, request-scoped search criteria. Never persisted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterSet {
    /// Lowercased search term. `"any"` is a wildcard: match everything,
    /// apply the remaining filters only.
    pub term: Option<String>,
    pub location: Option<LocationFilter>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub no_experience_required: bool,
    pub training_provided: bool,
    pub saved_only: bool,
    pub salary: Option<SalaryBounds>,
}

impl FilterSet {
    /// Builds a `FilterSet` from raw query parameters. Unparseable numeric
    /// input on an optional filter drops that one filter rather than failing
    /// the whole request.
    #[must_use]
    pub fn from_raw(raw: &RawSearchParams) -> Self {
        let term = normalize_opt(raw.search.as_deref());
        let job_type = normalize_opt(raw.job_type.as_deref());
        let experience_level = normalize_opt(raw.level.as_deref());

        let location_text = raw.location.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let from_coordinates = location_text.is_some_and(|l| l.starts_with(COORDINATE_PREFIX));

        let explicit_coords = raw
            .lat
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .zip(raw.lng.as_deref().and_then(|v| v.trim().parse::<f64>().ok()));
        let coords = explicit_coords.or_else(|| location_text.and_then(parse_coordinate_text));

        let radius_km = raw
            .radius
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|r| *r > 0.0)
            .unwrap_or(DEFAULT_RADIUS_MILES)
            * MILES_TO_KM;

        let location = match (coords, location_text) {
            (Some((lat, lng)), text) => Some(LocationFilter::Geographic {
                lat,
                lng,
                radius_km,
                from_coordinates,
                primary_token: if from_coordinates {
                    None
                } else {
                    text.map(primary_token)
                },
            }),
            (None, Some(text)) => Some(LocationFilter::Text {
                primary_token: primary_token(text),
            }),
            (None, None) => None,
        };

        let period = raw
            .salary_period
            .as_deref()
            .and_then(|p| p.trim().parse::<SalaryPeriod>().ok())
            .unwrap_or_default();
        let min_annual = parse_salary(raw.salary_min.as_deref(), period);
        let max_annual = parse_salary(raw.salary_max.as_deref(), period);
        let salary = (min_annual.is_some() || max_annual.is_some()).then_some(SalaryBounds {
            min_annual,
            max_annual,
        });

        Self {
            term,
            location,
            job_type,
            experience_level,
            no_experience_required: parse_flag(raw.no_experience_required.as_deref()),
            training_provided: parse_flag(raw.training_provided.as_deref()),
            saved_only: parse_flag(raw.saved.as_deref()),
            salary,
        }
    }

    /// True when no criterion is set at all. The caller must render an empty
    /// result set for an empty filter, never "match all".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.term.is_none()
            && self.location.is_none()
            && self.job_type.is_none()
            && self.experience_level.is_none()
            && !self.no_experience_required
            && !self.training_provided
            && !self.saved_only
            && self.salary.is_none()
    }

    #[must_use]
    pub fn is_wildcard_term(&self) -> bool {
        self.term.as_deref() == Some(crate::constants::search::ANY_TERM)
    }
}

fn normalize_opt(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true" | "1"))
}

fn parse_salary(value: Option<&str>, period: SalaryPeriod) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| period.to_annual(v))
}

/// First comma-separated segment of a location string, lowercased. A job
/// located in "Camden, London, UK" is matched on "camden".
fn primary_token(location: &str) -> String {
    location
        .split(',')
        .next()
        .unwrap_or(location)
        .trim()
        .to_lowercase()
}

/// Parses `geo:<lat>,<lng>` location text into a coordinate pair.
fn parse_coordinate_text(location: &str) -> Option<(f64, f64)> {
    let rest = location.strip_prefix(COORDINATE_PREFIX)?;
    let (lat, lng) = rest.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)).then_some((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_produce_empty_filter_set() {
        let filters = FilterSet::from_raw(&RawSearchParams::default());
        assert!(filters.is_empty());
    }

    #[test]
    fn term_is_trimmed_and_lowercased() {
        let raw = RawSearchParams {
            search: Some("  Electrician  ".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);
        assert_eq!(filters.term.as_deref(), Some("electrician"));
        assert!(!filters.is_wildcard_term());
    }

    #[test]
    fn any_term_is_wildcard() {
        let raw = RawSearchParams {
            search: Some("Any".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);
        assert!(filters.is_wildcard_term());
        assert!(!filters.is_empty());
    }

    #[test]
    fn explicit_coordinates_enter_geographic_mode_with_default_radius() {
        let raw = RawSearchParams {
            location: Some("London, UK".to_string()),
            lat: Some("51.5".to_string()),
            lng: Some("-0.12".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);

        match filters.location {
            Some(LocationFilter::Geographic {
                lat,
                lng,
                radius_km,
                from_coordinates,
                primary_token,
            }) => {
                assert_eq!(lat, 51.5);
                assert_eq!(lng, -0.12);
                assert!((radius_km - 16.09344).abs() < 1e-6);
                assert!(!from_coordinates);
                assert_eq!(primary_token.as_deref(), Some("london"));
            }
            other => panic!("expected geographic mode, got {other:?}"),
        }
    }

    #[test]
    fn coordinate_derived_text_has_no_primary_token() {
        let raw = RawSearchParams {
            location: Some("geo:51.5074,-0.1278".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);

        match filters.location {
            Some(LocationFilter::Geographic {
                lat,
                lng,
                from_coordinates,
                primary_token,
                ..
            }) => {
                assert_eq!(lat, 51.5074);
                assert_eq!(lng, -0.1278);
                assert!(from_coordinates);
                assert_eq!(primary_token, None);
            }
            other => panic!("expected geographic mode, got {other:?}"),
        }
    }

    #[test]
    fn place_name_without_coordinates_falls_back_to_text() {
        let raw = RawSearchParams {
            location: Some("Camden, London, UK".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);
        assert_eq!(
            filters.location,
            Some(LocationFilter::Text {
                primary_token: "camden".to_string()
            })
        );
    }

    #[test]
    fn salary_bounds_convert_to_annual() {
        let raw = RawSearchParams {
            salary_min: Some("2500".to_string()),
            salary_period: Some("per_month".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);
        let bounds = filters.salary.expect("salary bounds");
        assert_eq!(bounds.min_annual, Some(30000.0));
        assert_eq!(bounds.max_annual, None);
    }

    #[test]
    fn unparseable_salary_is_ignored_not_rejected() {
        let raw = RawSearchParams {
            search: Some("roofer".to_string()),
            salary_min: Some("lots".to_string()),
            salary_max: Some("NaN".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);
        assert_eq!(filters.salary, None);
        assert_eq!(filters.term.as_deref(), Some("roofer"));
    }

    #[test]
    fn invalid_radius_falls_back_to_default() {
        let raw = RawSearchParams {
            lat: Some("51.5".to_string()),
            lng: Some("0".to_string()),
            radius: Some("-3".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);
        match filters.location {
            Some(LocationFilter::Geographic { radius_km, .. }) => {
                assert!((radius_km - 16.09344).abs() < 1e-6);
            }
            other => panic!("expected geographic mode, got {other:?}"),
        }
    }

    #[test]
    fn boolean_flags_parse_only_true_values() {
        let raw = RawSearchParams {
            saved: Some("true".to_string()),
            training_provided: Some("1".to_string()),
            no_experience_required: Some("false".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);
        assert!(filters.saved_only);
        assert!(filters.training_provided);
        assert!(!filters.no_experience_required);
    }

    #[test]
    fn out_of_range_coordinate_text_is_not_geographic() {
        let raw = RawSearchParams {
            location: Some("geo:123.0,-0.1".to_string()),
            ..Default::default()
        };
        let filters = FilterSet::from_raw(&raw);
        // The malformed text still acts as a plain text filter rather than
        // producing a bogus bounding box.
        assert!(matches!(filters.location, Some(LocationFilter::Text { .. })));
    }
}
