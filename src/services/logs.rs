use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::error;

use crate::db::Store;
use crate::domain::events::NotificationEvent;

/// Persists bus events to the `system_logs` table for the admin activity
/// feed.
pub struct LogService {
    store: Store,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl LogService {
    #[must_use]
    pub const fn new(store: Store, event_bus: broadcast::Sender<NotificationEvent>) -> Self {
        Self { store, event_bus }
    }

    pub fn start_listener(self: Arc<Self>) {
        let mut rx = self.event_bus.subscribe();
        let service = self;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Err(e) = service.handle_event(event).await {
                            error!(error = %e, "Failed to save log");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        error!(count, "Log listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("Log listener event bus closed");
                        break;
                    }
                }
            }
        });
    }

    async fn handle_event(&self, event: NotificationEvent) -> anyhow::Result<()> {
        let (event_type, level, message) = match &event {
            NotificationEvent::JobPosted { job_id, title } => (
                "JobPosted",
                "info",
                format!("Job #{job_id} posted: {title}"),
            ),
            NotificationEvent::JobDeactivated { job_id, title } => (
                "JobDeactivated",
                "info",
                format!("Job #{job_id} deactivated: {title}"),
            ),
            NotificationEvent::JobExtended { job_id, expires_at } => (
                "JobExtended",
                "info",
                format!("Job #{job_id} extended until {expires_at}"),
            ),
            NotificationEvent::MessageSent {
                sender_id,
                recipient_id,
                ..
            } => (
                "MessageSent",
                "info",
                format!("Message from profile {sender_id} to profile {recipient_id}"),
            ),
            NotificationEvent::ReportFiled {
                report_id,
                reported_id,
            } => (
                "ReportFiled",
                "warn",
                format!("Report #{report_id} filed against profile {reported_id}"),
            ),
            NotificationEvent::ReportClosed { report_id, status } => (
                "ReportClosed",
                "info",
                format!("Report #{report_id} closed as {status}"),
            ),
            NotificationEvent::ProfileBanned { profile_id } => (
                "ProfileBanned",
                "warn",
                format!("Profile {profile_id} banned"),
            ),
            NotificationEvent::ProfileUnbanned { profile_id } => (
                "ProfileUnbanned",
                "info",
                format!("Profile {profile_id} unbanned"),
            ),
            NotificationEvent::SubscriptionStarted { profile_id, plan } => (
                "SubscriptionStarted",
                "info",
                format!("Profile {profile_id} subscribed to {plan}"),
            ),
            NotificationEvent::SubscriptionCancelled { profile_id } => (
                "SubscriptionCancelled",
                "info",
                format!("Profile {profile_id} cancelled their subscription"),
            ),
            NotificationEvent::Error { message } => ("Error", "error", message.clone()),
            NotificationEvent::Info { message } => ("Info", "info", message.clone()),
        };

        let details = serde_json::to_string(&event).ok();
        self.store
            .add_log(event_type, level, &message, details)
            .await
    }
}
