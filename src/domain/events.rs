//! Domain events for the application.
//!
//! These events are sent via the event bus to notify connected clients of
//! marketplace activity, and are persisted to the activity log by the log
//! service.

use serde::Serialize;

/// Events sent to connected clients via SSE (Server-Sent Events).
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    JobPosted {
        job_id: i64,
        title: String,
    },
    JobDeactivated {
        job_id: i64,
        title: String,
    },
    JobExtended {
        job_id: i64,
        expires_at: String,
    },

    MessageSent {
        message_id: i64,
        sender_id: i64,
        recipient_id: i64,
    },

    ReportFiled {
        report_id: i64,
        reported_id: i64,
    },
    ReportClosed {
        report_id: i64,
        status: String,
    },

    ProfileBanned {
        profile_id: i64,
    },
    ProfileUnbanned {
        profile_id: i64,
    },

    SubscriptionStarted {
        profile_id: i64,
        plan: String,
    },
    SubscriptionCancelled {
        profile_id: i64,
    },

    Error {
        message: String,
    },
    Info {
        message: String,
    },
}
