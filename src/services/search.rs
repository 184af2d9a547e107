use tracing::error;

use crate::db::Store;
use crate::search::{
    EnrichedJob, FilterSet, RawSearchParams, apply_cap, compose, enrich, map_center,
};

/// The complete answer to one search request: map-ready markers, the
/// truncation flag with its user-facing notice, and the coordinate pair the
/// map should center on.
#[derive(Debug)]
pub struct SearchOutcome {
    pub jobs: Vec<EnrichedJob>,
    pub truncated: bool,
    pub notice: Option<String>,
    pub map_center: (f64, f64),
}

/// Orchestrates one search request: normalize, compose, execute, enrich,
/// cap. Infallible by contract: a query-layer failure is logged and degrades
/// to an empty outcome, never to an error the page has to handle.
pub struct SearchService {
    store: Store,
}

impl SearchService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn search(
        &self,
        raw: &RawSearchParams,
        viewer_profile: Option<i64>,
    ) -> SearchOutcome {
        let filters = FilterSet::from_raw(raw);

        // An entirely empty filter set means "no search yet": render nothing
        // rather than dumping every active job.
        if filters.is_empty() {
            return Self::empty(&filters);
        }

        match self.run(&filters, viewer_profile).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Job search failed, degrading to empty result");
                Self::empty(&filters)
            }
        }
    }

    fn empty(filters: &FilterSet) -> SearchOutcome {
        SearchOutcome {
            jobs: Vec::new(),
            truncated: false,
            notice: None,
            map_center: map_center(filters, &[]),
        }
    }

    async fn run(
        &self,
        filters: &FilterSet,
        viewer_profile: Option<i64>,
    ) -> anyhow::Result<SearchOutcome> {
        let now = chrono::Utc::now().to_rfc3339();

        let banned = self.store.banned_profile_ids().await?;

        // The saved-jobs filter needs a viewer; anonymous requests fall
        // through with the filter ignored.
        let saved_ids = match (filters.saved_only, viewer_profile) {
            (true, Some(profile_id)) => Some(self.store.saved_job_ids(profile_id).await?),
            _ => None,
        };

        let composed = compose(filters, &now, &banned, saved_ids.as_deref());
        let matched = self.store.search_jobs(&composed).await?;

        let mut poster_ids: Vec<i64> = matched.iter().map(|j| j.poster_id).collect();
        poster_ids.sort_unstable();
        poster_ids.dedup();

        let posters = self.store.get_profiles_by_ids(&poster_ids).await?;
        let ratings = self.store.rating_summaries_for(&poster_ids).await?;

        let enriched = enrich(matched, &posters, &ratings);
        let (jobs, truncated) = apply_cap(composed.wildcard, enriched);

        let notice = truncated.then(|| {
            "Showing the first 50 matches. Narrow your search to see more relevant results."
                .to_string()
        });
        let map_center = map_center(filters, &jobs);

        Ok(SearchOutcome {
            jobs,
            truncated,
            notice,
            map_center,
        })
    }
}
