use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{messages, ratings, reports, subscriptions, system_logs};
use crate::models::{Job, Profile, Role};
use crate::search::{ComposedQuery, RatingSummary};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    /// Opens the database with fixed pool timeouts and runs migrations.
    /// There is deliberately no retry layer: a failed lookup degrades at the
    /// call site instead of being retried here.
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn job_repo(&self) -> repositories::job::JobRepository {
        repositories::job::JobRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn rating_repo(&self) -> repositories::rating::RatingRepository {
        repositories::rating::RatingRepository::new(self.conn.clone())
    }

    fn saved_repo(&self) -> repositories::saved::SavedJobRepository {
        repositories::saved::SavedJobRepository::new(self.conn.clone())
    }

    fn message_repo(&self) -> repositories::message::MessageRepository {
        repositories::message::MessageRepository::new(self.conn.clone())
    }

    fn report_repo(&self) -> repositories::report::ReportRepository {
        repositories::report::ReportRepository::new(self.conn.clone())
    }

    fn subscription_repo(&self) -> repositories::subscription::SubscriptionRepository {
        repositories::subscription::SubscriptionRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn logs_repo(&self) -> repositories::logs::LogRepository {
        repositories::logs::LogRepository::new(self.conn.clone())
    }

    // ========== Jobs ==========

    pub async fn create_job(&self, job: &Job) -> Result<Job> {
        self.job_repo().create(job).await
    }

    pub async fn get_job(&self, id: i64) -> Result<Option<Job>> {
        self.job_repo().get(id).await
    }

    pub async fn update_job(&self, job: &Job) -> Result<()> {
        self.job_repo().update(job).await
    }

    pub async fn list_jobs_for_poster(&self, poster_id: i64) -> Result<Vec<Job>> {
        self.job_repo().list_for_poster(poster_id).await
    }

    pub async fn set_job_active(&self, id: i64, active: bool) -> Result<()> {
        self.job_repo().set_active(id, active).await
    }

    pub async fn set_job_expiry(&self, id: i64, expires_at: Option<&str>) -> Result<()> {
        self.job_repo().set_expiry(id, expires_at).await
    }

    pub async fn remove_job(&self, id: i64) -> Result<bool> {
        self.job_repo().remove(id).await
    }

    pub async fn search_jobs(&self, query: &ComposedQuery) -> Result<Vec<Job>> {
        self.job_repo().search(query).await
    }

    pub async fn count_jobs(&self) -> Result<u64> {
        self.job_repo().count_all().await
    }

    pub async fn count_active_jobs(&self, now: &str) -> Result<u64> {
        self.job_repo().count_active(now).await
    }

    pub async fn count_expired_jobs(&self, now: &str) -> Result<u64> {
        self.job_repo().count_expired(now).await
    }

    // ========== Profiles ==========

    pub async fn create_profile(&self, profile: &Profile) -> Result<Profile> {
        self.profile_repo().create(profile).await
    }

    pub async fn get_profile(&self, id: i64) -> Result<Option<Profile>> {
        self.profile_repo().get(id).await
    }

    pub async fn get_profiles_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, Profile>> {
        self.profile_repo().get_by_ids(ids).await
    }

    pub async fn update_profile(&self, profile: &Profile) -> Result<()> {
        self.profile_repo().update(profile).await
    }

    pub async fn set_profile_banned(&self, id: i64, banned: bool) -> Result<bool> {
        self.profile_repo().set_banned(id, banned).await
    }

    pub async fn banned_profile_ids(&self) -> Result<Vec<i64>> {
        self.profile_repo().banned_ids().await
    }

    pub async fn count_profiles_by_role(&self, role: Role) -> Result<u64> {
        self.profile_repo().count_by_role(role).await
    }

    // ========== Ratings ==========

    pub async fn rate_profile(
        &self,
        rated_id: i64,
        rater_id: i64,
        stars: i32,
        comment: Option<&str>,
        now: &str,
    ) -> Result<()> {
        self.rating_repo()
            .rate(rated_id, rater_id, stars, comment, now)
            .await
    }

    pub async fn list_ratings_for(&self, rated_id: i64) -> Result<Vec<ratings::Model>> {
        self.rating_repo().list_for_profile(rated_id).await
    }

    pub async fn rating_summaries_for(
        &self,
        rated_ids: &[i64],
    ) -> Result<HashMap<i64, RatingSummary>> {
        self.rating_repo().summaries_for(rated_ids).await
    }

    pub async fn rating_summary_for(&self, rated_id: i64) -> Result<RatingSummary> {
        self.rating_repo().summary_for(rated_id).await
    }

    // ========== Saved jobs ==========

    pub async fn save_job(&self, profile_id: i64, job_id: i64, now: &str) -> Result<bool> {
        self.saved_repo().save(profile_id, job_id, now).await
    }

    pub async fn unsave_job(&self, profile_id: i64, job_id: i64) -> Result<bool> {
        self.saved_repo().unsave(profile_id, job_id).await
    }

    pub async fn saved_job_ids(&self, profile_id: i64) -> Result<Vec<i64>> {
        self.saved_repo().job_ids_for_profile(profile_id).await
    }

    pub async fn is_job_saved(&self, profile_id: i64, job_id: i64) -> Result<bool> {
        self.saved_repo().is_saved(profile_id, job_id).await
    }

    // ========== Messages ==========

    pub async fn send_message(
        &self,
        sender_id: i64,
        recipient_id: i64,
        body: &str,
        now: &str,
    ) -> Result<messages::Model> {
        self.message_repo()
            .send(sender_id, recipient_id, body, now)
            .await
    }

    pub async fn conversation(&self, a: i64, b: i64) -> Result<Vec<messages::Model>> {
        self.message_repo().conversation(a, b).await
    }

    pub async fn messages_for_profile(&self, profile_id: i64) -> Result<Vec<messages::Model>> {
        self.message_repo().list_for_profile(profile_id).await
    }

    pub async fn unread_message_count(&self, recipient_id: i64) -> Result<u64> {
        self.message_repo().unread_count(recipient_id).await
    }

    pub async fn mark_message_read(&self, message_id: i64, recipient_id: i64) -> Result<bool> {
        self.message_repo().mark_read(message_id, recipient_id).await
    }

    pub async fn count_messages(&self) -> Result<u64> {
        self.message_repo().count_all().await
    }

    // ========== Reports ==========

    pub async fn file_report(
        &self,
        reporter_id: i64,
        reported_id: i64,
        reason: &str,
        now: &str,
    ) -> Result<reports::Model> {
        self.report_repo()
            .file(reporter_id, reported_id, reason, now)
            .await
    }

    pub async fn get_report(&self, id: i64) -> Result<Option<reports::Model>> {
        self.report_repo().get(id).await
    }

    pub async fn list_reports(&self, status: Option<&str>) -> Result<Vec<reports::Model>> {
        self.report_repo().list(status).await
    }

    pub async fn set_report_status(
        &self,
        id: i64,
        status: &str,
        resolution: Option<&str>,
        now: &str,
    ) -> Result<bool> {
        self.report_repo()
            .set_status(id, status, resolution, now)
            .await
    }

    pub async fn open_report_count(&self) -> Result<u64> {
        self.report_repo().open_count().await
    }

    // ========== Subscriptions ==========

    pub async fn current_subscription(
        &self,
        profile_id: i64,
    ) -> Result<Option<subscriptions::Model>> {
        self.subscription_repo().current_for_profile(profile_id).await
    }

    pub async fn start_subscription(
        &self,
        profile_id: i64,
        plan: &str,
        expires_at: Option<&str>,
        now: &str,
    ) -> Result<subscriptions::Model> {
        self.subscription_repo()
            .start(profile_id, plan, expires_at, now)
            .await
    }

    pub async fn cancel_subscription(&self, profile_id: i64) -> Result<bool> {
        self.subscription_repo().cancel(profile_id).await
    }

    // ========== Users ==========

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        profile: &Profile,
        security: &SecurityConfig,
    ) -> Result<(User, Profile)> {
        self.user_repo()
            .create_with_profile(username, password, profile, security)
            .await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, security)
            .await
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }

    // ========== Logs ==========

    pub async fn add_log(
        &self,
        event_type: &str,
        level: &str,
        message: &str,
        details: Option<String>,
    ) -> Result<()> {
        self.logs_repo()
            .add(event_type, level, message, details)
            .await
    }

    pub async fn get_logs(
        &self,
        page: u64,
        page_size: u64,
        level_filter: Option<String>,
        event_type_filter: Option<String>,
    ) -> Result<(Vec<system_logs::Model>, u64)> {
        self.logs_repo()
            .get_logs(page, page_size, level_filter, event_type_filter)
            .await
    }

    pub async fn clear_logs(&self) -> Result<()> {
        self.logs_repo().clear_logs().await
    }
}
