use thiserror::Error;
use tokio::sync::broadcast;
use tracing::info;

use crate::constants::limits::MAX_REPORT_REASON_LEN;
use crate::db::Store;
use crate::db::repositories::report::{STATUS_DISMISSED, STATUS_OPEN, STATUS_RESOLVED};
use crate::domain::events::NotificationEvent;
use crate::entities::reports;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Profile {0} not found")]
    ProfileNotFound(i64),

    #[error("Report {0} not found")]
    ReportNotFound(i64),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Admin back-office operations: profile bans and the reported-users
/// workflow.
pub struct ModerationService {
    store: Store,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl ModerationService {
    #[must_use]
    pub const fn new(store: Store, event_bus: broadcast::Sender<NotificationEvent>) -> Self {
        Self { store, event_bus }
    }

    /// Flags a profile as banned. Its postings drop out of search on the
    /// next request; nothing is deleted.
    pub async fn ban(&self, profile_id: i64) -> Result<(), ModerationError> {
        if !self.store.set_profile_banned(profile_id, true).await? {
            return Err(ModerationError::ProfileNotFound(profile_id));
        }

        let _ = self
            .event_bus
            .send(NotificationEvent::ProfileBanned { profile_id });
        Ok(())
    }

    pub async fn unban(&self, profile_id: i64) -> Result<(), ModerationError> {
        if !self.store.set_profile_banned(profile_id, false).await? {
            return Err(ModerationError::ProfileNotFound(profile_id));
        }

        let _ = self
            .event_bus
            .send(NotificationEvent::ProfileUnbanned { profile_id });
        Ok(())
    }

    pub async fn file_report(
        &self,
        reporter_id: i64,
        reported_id: i64,
        reason: &str,
    ) -> Result<reports::Model, ModerationError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ModerationError::Validation(
                "Report reason cannot be empty".to_string(),
            ));
        }
        if reason.len() > MAX_REPORT_REASON_LEN {
            return Err(ModerationError::Validation(format!(
                "Report reason must be {MAX_REPORT_REASON_LEN} characters or less"
            )));
        }
        if reporter_id == reported_id {
            return Err(ModerationError::Validation(
                "You cannot report yourself".to_string(),
            ));
        }

        if self.store.get_profile(reported_id).await?.is_none() {
            return Err(ModerationError::ProfileNotFound(reported_id));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let report = self
            .store
            .file_report(reporter_id, reported_id, reason, &now)
            .await?;

        let _ = self.event_bus.send(NotificationEvent::ReportFiled {
            report_id: report.id,
            reported_id,
        });

        Ok(report)
    }

    pub async fn list_reports(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<reports::Model>, ModerationError> {
        if let Some(s) = status
            && ![STATUS_OPEN, STATUS_RESOLVED, STATUS_DISMISSED].contains(&s)
        {
            return Err(ModerationError::Validation(format!(
                "Unknown report status '{s}'"
            )));
        }

        Ok(self.store.list_reports(status).await?)
    }

    pub async fn resolve_report(
        &self,
        report_id: i64,
        resolution: Option<&str>,
    ) -> Result<(), ModerationError> {
        self.close_report(report_id, STATUS_RESOLVED, resolution).await
    }

    pub async fn dismiss_report(
        &self,
        report_id: i64,
        resolution: Option<&str>,
    ) -> Result<(), ModerationError> {
        self.close_report(report_id, STATUS_DISMISSED, resolution).await
    }

    async fn close_report(
        &self,
        report_id: i64,
        status: &str,
        resolution: Option<&str>,
    ) -> Result<(), ModerationError> {
        let now = chrono::Utc::now().to_rfc3339();
        if !self
            .store
            .set_report_status(report_id, status, resolution, &now)
            .await?
        {
            return Err(ModerationError::ReportNotFound(report_id));
        }

        info!(report_id, status, "Report closed");

        let _ = self.event_bus.send(NotificationEvent::ReportClosed {
            report_id,
            status: status.to_string(),
        });
        Ok(())
    }
}
