pub mod prelude;

pub mod jobs;
pub mod messages;
pub mod profiles;
pub mod ratings;
pub mod reports;
pub mod saved_jobs;
pub mod subscriptions;
pub mod system_logs;
pub mod users;
