use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
pub mod events;
mod jobs;
mod messages;
mod observability;
mod profiles;
mod ratings;
mod search;
mod subscriptions;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(
        &self,
    ) -> &tokio::sync::broadcast::Sender<crate::domain::events::NotificationEvent> {
        &self.shared.event_bus
    }

    #[must_use]
    pub fn search_service(&self) -> &Arc<crate::services::SearchService> {
        &self.shared.search_service
    }

    #[must_use]
    pub fn job_service(&self) -> &Arc<crate::services::JobService> {
        &self.shared.job_service
    }

    #[must_use]
    pub fn moderation_service(&self) -> &Arc<crate::services::ModerationService> {
        &self.shared.moderation_service
    }

    #[must_use]
    pub fn billing_service(&self) -> &Arc<crate::services::BillingService> {
        &self.shared.billing_service
    }

    #[must_use]
    pub fn stats_service(&self) -> &Arc<crate::services::StatsService> {
        &self.shared.stats_service
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_minutes,
        )
    };

    let protected_routes = create_protected_router(state.clone());
    let admin_routes = create_admin_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .nest("/admin", admin_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/signup", post(profiles::signup))
        .route("/jobs/search", get(search::search_jobs))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/password", post(auth::change_password))
        .route("/auth/api-key", post(auth::regenerate_api_key))
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/mine", get(jobs::my_jobs))
        .route("/jobs/saved", get(jobs::saved_jobs))
        .route("/jobs/{id}", get(jobs::get_job))
        .route("/jobs/{id}", put(jobs::update_job))
        .route("/jobs/{id}", delete(jobs::delete_job))
        .route("/jobs/{id}/extend", post(jobs::extend_job))
        .route("/jobs/{id}/deactivate", post(jobs::deactivate_job))
        .route("/jobs/{id}/save", post(jobs::save_job))
        .route("/jobs/{id}/save", delete(jobs::unsave_job))
        .route("/profiles/me", put(profiles::update_my_profile))
        .route("/profiles/{id}", get(profiles::get_profile))
        .route("/profiles/{id}/ratings", get(ratings::list_ratings))
        .route("/profiles/{id}/ratings", post(ratings::rate_profile))
        .route("/messages", post(messages::send_message))
        .route("/messages", get(messages::inbox))
        .route("/messages/with/{id}", get(messages::conversation))
        .route("/messages/{id}/read", post(messages::mark_read))
        .route("/reports", post(admin::file_report))
        .route("/subscriptions", post(subscriptions::subscribe))
        .route("/subscriptions", delete(subscriptions::cancel))
        .route("/subscriptions/current", get(subscriptions::current))
        .route("/metrics", get(observability::get_metrics))
        .merge(events::router())
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports", get(admin::list_reports))
        .route("/reports/{id}/resolve", post(admin::resolve_report))
        .route("/reports/{id}/dismiss", post(admin::dismiss_report))
        .route("/profiles/{id}/ban", post(admin::ban_profile))
        .route("/profiles/{id}/unban", post(admin::unban_profile))
        .route("/stats", get(admin::get_stats))
        .route("/logs", get(admin::get_logs))
        .route("/logs", delete(admin::clear_logs))
        .route_layer(middleware::from_fn(auth::admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
