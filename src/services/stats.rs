use serde::Serialize;

use crate::db::Store;
use crate::models::Role;

/// Aggregate numbers for the admin analytics panel.
#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub jobseekers: u64,
    pub homeowners: u64,
    pub employers: u64,
    pub tradespeople: u64,
    pub total_jobs: u64,
    pub active_jobs: u64,
    pub expired_jobs: u64,
    pub messages: u64,
    pub open_reports: u64,
}

pub struct StatsService {
    store: Store,
}

impl StatsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn admin_stats(&self) -> anyhow::Result<AdminStats> {
        let now = chrono::Utc::now().to_rfc3339();

        Ok(AdminStats {
            jobseekers: self.store.count_profiles_by_role(Role::Jobseeker).await?,
            homeowners: self.store.count_profiles_by_role(Role::Homeowner).await?,
            employers: self.store.count_profiles_by_role(Role::Employer).await?,
            tradespeople: self.store.count_profiles_by_role(Role::Tradesperson).await?,
            total_jobs: self.store.count_jobs().await?,
            active_jobs: self.store.count_active_jobs(&now).await?,
            expired_jobs: self.store.count_expired_jobs(&now).await?,
            messages: self.store.count_messages().await?,
            open_reports: self.store.open_report_count().await?,
        })
    }
}
