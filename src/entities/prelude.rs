pub use super::jobs::Entity as Jobs;
pub use super::messages::Entity as Messages;
pub use super::profiles::Entity as Profiles;
pub use super::ratings::Entity as Ratings;
pub use super::reports::Entity as Reports;
pub use super::saved_jobs::Entity as SavedJobs;
pub use super::subscriptions::Entity as Subscriptions;
pub use super::system_logs::Entity as SystemLogs;
pub use super::users::Entity as Users;
