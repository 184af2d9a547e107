//! Job search core: normalization of raw query parameters, predicate
//! composition, result enrichment, and the overflow guard for unrestricted
//! searches.
//!
//! Everything in here is request-scoped. A [`FilterSet`] is built per
//! request, composed into a database condition, and discarded with the
//! response.

pub mod compose;
pub mod enrich;
pub mod filter;
pub mod geo;
pub mod overflow;

pub use compose::{ComposedQuery, compose, match_nothing, salary_condition};
pub use enrich::{EnrichedJob, PosterInfo, RatingSummary, enrich};
pub use filter::{FilterSet, LocationFilter, RawSearchParams, SalaryBounds};
pub use geo::BoundingBox;
pub use overflow::apply_cap;

use crate::constants::search::DEFAULT_MAP_CENTER;

/// Picks the coordinate pair the map should center on: the request's own
/// coordinates when it carried any, else the first result with coordinates,
/// else central London.
#[must_use]
pub fn map_center(filters: &FilterSet, results: &[EnrichedJob]) -> (f64, f64) {
    if let Some(LocationFilter::Geographic { lat, lng, .. }) = &filters.location {
        return (*lat, *lng);
    }

    results
        .iter()
        .find_map(|j| j.job.latitude.zip(j.job.longitude))
        .unwrap_or(DEFAULT_MAP_CENTER)
}
