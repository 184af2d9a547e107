use sea_orm::{ColumnTrait, Condition};

use crate::constants::search::{ALL_SENTINEL, ANY_SEARCH_CAP};
use crate::entities::jobs;

use super::filter::{FilterSet, LocationFilter, SalaryBounds};
use super::geo::BoundingBox;

/// A composed search query: the conjunctive predicate set for everything
/// except salary, plus the salary bounds kept separate so the executing
/// repository can choose between the indexed path and the recompute
/// fallback.
#[derive(Debug, Clone)]
pub struct ComposedQuery {
    pub filter: Condition,
    pub salary: Option<SalaryBounds>,
    /// `Some(cap + 1)` for wildcard searches; the extra row is the overflow
    /// probe.
    pub fetch_limit: Option<u64>,
    pub wildcard: bool,
}

/// Translates a normalized [`FilterSet`] into predicates over the jobs
/// table. Every query is constrained to active, unexpired postings;
/// `banned_posters` are excluded outright. `saved_ids` is `Some` when the
/// request asked for saved jobs and a viewer is known.
#[must_use]
pub fn compose(
    filters: &FilterSet,
    now: &str,
    banned_posters: &[i64],
    saved_ids: Option<&[i64]>,
) -> ComposedQuery {
    let mut cond = Condition::all()
        .add(jobs::Column::IsActive.eq(true))
        .add(
            Condition::any()
                .add(jobs::Column::ExpiresAt.is_null())
                .add(jobs::Column::ExpiresAt.gt(now)),
        );

    if let Some(term) = &filters.term
        && !filters.is_wildcard_term()
    {
        cond = cond.add(
            Condition::any()
                .add(jobs::Column::Title.contains(term.as_str()))
                .add(jobs::Column::Description.contains(term.as_str())),
        );
    }

    match &filters.location {
        Some(LocationFilter::Geographic {
            lat,
            lng,
            radius_km,
            primary_token,
            ..
        }) => {
            let bbox = BoundingBox::around(*lat, *lng, *radius_km);
            let in_box = Condition::all()
                .add(jobs::Column::Latitude.between(bbox.min_lat, bbox.max_lat))
                .add(jobs::Column::Longitude.between(bbox.min_lng, bbox.max_lng));

            // A place-name token rescues jobs that never got geocoded;
            // coordinate-derived text carries no place name to match.
            cond = cond.add(match primary_token {
                Some(token) => Condition::any()
                    .add(in_box)
                    .add(jobs::Column::Location.contains(token.as_str())),
                None => in_box,
            });
        }
        Some(LocationFilter::Text { primary_token }) => {
            cond = cond.add(jobs::Column::Location.contains(primary_token.as_str()));
        }
        None => {}
    }

    if let Some(job_type) = &filters.job_type
        && job_type != ALL_SENTINEL
    {
        cond = cond.add(jobs::Column::JobType.eq(job_type.clone()));
    }

    if let Some(level) = &filters.experience_level
        && level != ALL_SENTINEL
    {
        cond = cond.add(jobs::Column::ExperienceLevel.eq(level.clone()));
    }

    if filters.no_experience_required {
        cond = cond.add(jobs::Column::NoExperienceRequired.eq(true));
    }

    if filters.training_provided {
        cond = cond.add(jobs::Column::TrainingProvided.eq(true));
    }

    if !banned_posters.is_empty() {
        cond = cond.add(jobs::Column::PosterId.is_not_in(banned_posters.iter().copied()));
    }

    if let Some(ids) = saved_ids {
        cond = if ids.is_empty() {
            cond.add(match_nothing())
        } else {
            cond.add(jobs::Column::Id.is_in(ids.iter().copied()))
        };
    }

    let wildcard = filters.is_wildcard_term();

    ComposedQuery {
        filter: cond,
        salary: filters.salary,
        fetch_limit: wildcard.then(|| (ANY_SEARCH_CAP + 1) as u64),
        wildcard,
    }
}

/// Indexed salary predicates over the precomputed annual-equivalent columns.
/// A requested minimum admits a job whose annual range reaches it; a
/// requested maximum admits a job whose annual range starts under it. Both
/// bounds are inclusive.
#[must_use]
pub fn salary_condition(bounds: &SalaryBounds) -> Condition {
    let mut cond = Condition::all();

    if let Some(min) = bounds.min_annual {
        cond = cond.add(
            Condition::any()
                .add(jobs::Column::AnnualMax.gte(min))
                .add(jobs::Column::AnnualMin.gte(min)),
        );
    }

    if let Some(max) = bounds.max_annual {
        cond = cond.add(
            Condition::any()
                .add(jobs::Column::AnnualMin.lte(max))
                .add(jobs::Column::AnnualMax.lte(max)),
        );
    }

    cond
}

/// In-application mirror of [`salary_condition`], used by the recompute
/// fallback when the indexed columns cannot be queried.
#[must_use]
pub fn salary_admits(
    bounds: &SalaryBounds,
    annual_min: Option<f64>,
    annual_max: Option<f64>,
) -> bool {
    let min_ok = bounds.min_annual.is_none_or(|min| {
        annual_max.is_some_and(|v| v >= min) || annual_min.is_some_and(|v| v >= min)
    });
    let max_ok = bounds.max_annual.is_none_or(|max| {
        annual_min.is_some_and(|v| v <= max) || annual_max.is_some_and(|v| v <= max)
    });
    min_ok && max_ok
}

/// Condition that can never be satisfied: the explicit "match nothing"
/// sentinel used when a degenerate filter must force an empty result
/// instead of silently widening.
#[must_use]
pub fn match_nothing() -> Condition {
    Condition::all().add(jobs::Column::Id.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::filter::RawSearchParams;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    const NOW: &str = "2026-06-01T00:00:00+00:00";

    /// The WHERE clause the composed condition renders to, so assertions do
    /// not trip over column names in the SELECT list.
    fn where_clause(condition: Condition) -> String {
        let sql = jobs::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string();
        sql.split_once("WHERE").expect("query has a WHERE clause").1.to_string()
    }

    fn sql_for(filters: &FilterSet) -> String {
        where_clause(compose(filters, NOW, &[], None).filter)
    }

    fn from_raw(raw: RawSearchParams) -> FilterSet {
        FilterSet::from_raw(&raw)
    }

    #[test]
    fn every_query_constrains_visibility() {
        let sql = sql_for(&from_raw(RawSearchParams {
            search: Some("any".to_string()),
            ..Default::default()
        }));
        assert!(sql.contains("is_active"));
        assert!(sql.contains("expires_at"));
    }

    #[test]
    fn wildcard_term_adds_no_text_predicate_but_sets_probe_limit() {
        let filters = from_raw(RawSearchParams {
            search: Some("any".to_string()),
            ..Default::default()
        });
        let composed = compose(&filters, NOW, &[], None);
        assert!(composed.wildcard);
        assert_eq!(composed.fetch_limit, Some(51));

        let sql = sql_for(&filters);
        assert!(!sql.contains("title"));
    }

    #[test]
    fn plain_term_matches_title_or_description() {
        let sql = sql_for(&from_raw(RawSearchParams {
            search: Some("plumber".to_string()),
            ..Default::default()
        }));
        assert!(sql.contains("title"));
        assert!(sql.contains("description"));
        assert!(sql.contains("%plumber%"));
    }

    #[test]
    fn coordinate_derived_location_bypasses_text_matching() {
        let sql = sql_for(&from_raw(RawSearchParams {
            location: Some("geo:51.5,-0.12".to_string()),
            ..Default::default()
        }));
        assert!(sql.contains("latitude"));
        assert!(sql.contains("longitude"));
        assert!(!sql.contains("location"));
    }

    #[test]
    fn place_name_with_coordinates_rescues_ungeocoded_jobs() {
        let sql = sql_for(&from_raw(RawSearchParams {
            location: Some("London, UK".to_string()),
            lat: Some("51.5".to_string()),
            lng: Some("-0.12".to_string()),
            ..Default::default()
        }));
        assert!(sql.contains("latitude"));
        assert!(sql.contains("%london%"));
    }

    #[test]
    fn all_sentinel_adds_no_type_predicate() {
        let sql = sql_for(&from_raw(RawSearchParams {
            search: Some("any".to_string()),
            job_type: Some("all".to_string()),
            level: Some("all".to_string()),
            ..Default::default()
        }));
        assert!(!sql.contains("job_type"));
        assert!(!sql.contains("experience_level"));
    }

    #[test]
    fn explicit_type_and_level_match_exactly() {
        let sql = sql_for(&from_raw(RawSearchParams {
            job_type: Some("full_time".to_string()),
            level: Some("senior".to_string()),
            ..Default::default()
        }));
        assert!(sql.contains("job_type"));
        assert!(sql.contains("full_time"));
        assert!(sql.contains("senior"));
    }

    #[test]
    fn empty_saved_set_forces_match_nothing() {
        let filters = from_raw(RawSearchParams {
            saved: Some("true".to_string()),
            ..Default::default()
        });
        let composed = compose(&filters, NOW, &[], Some(&[]));
        let sql = where_clause(composed.filter);
        assert!(sql.contains("\"id\" IS NULL"));
    }

    #[test]
    fn salary_condition_is_inclusive_at_the_boundary() {
        let bounds = SalaryBounds {
            min_annual: Some(30000.0),
            max_annual: None,
        };
        // Monthly 2500 -> annual 30000 exactly on the requested minimum.
        assert!(salary_admits(&bounds, None, Some(30000.0)));
        assert!(!salary_admits(&bounds, None, Some(29999.0)));
        assert!(!salary_admits(&bounds, None, None));
    }

    #[test]
    fn salary_admits_checks_both_bounds() {
        let bounds = SalaryBounds {
            min_annual: Some(20000.0),
            max_annual: Some(40000.0),
        };
        assert!(salary_admits(&bounds, Some(25000.0), Some(35000.0)));
        assert!(!salary_admits(&bounds, Some(5000.0), Some(10000.0)));
        assert!(!salary_admits(&bounds, Some(50000.0), Some(60000.0)));
    }
}
