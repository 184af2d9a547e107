use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::services::{
    BillingService, JobService, LogService, ModerationService, SearchService, StatsService,
};

/// Everything one running instance shares: configuration, the store, the
/// event bus, and the services wired on top of them.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub event_bus: broadcast::Sender<NotificationEvent>,

    pub search_service: Arc<SearchService>,

    pub job_service: Arc<JobService>,

    pub moderation_service: Arc<ModerationService>,

    pub billing_service: Arc<BillingService>,

    pub stats_service: Arc<StatsService>,

    pub log_service: Arc<LogService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::init_with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        Self::init_with_event_bus(config, event_bus).await
    }

    async fn init_with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let config_arc = Arc::new(RwLock::new(config));

        let search_service = Arc::new(SearchService::new(store.clone()));

        let job_service = Arc::new(JobService::new(
            store.clone(),
            config_arc.clone(),
            event_bus.clone(),
        ));

        let moderation_service =
            Arc::new(ModerationService::new(store.clone(), event_bus.clone()));

        let billing_service = Arc::new(BillingService::new(
            store.clone(),
            config_arc.clone(),
            event_bus.clone(),
        ));

        let stats_service = Arc::new(StatsService::new(store.clone()));

        let log_service = Arc::new(LogService::new(store.clone(), event_bus.clone()));
        log_service.clone().start_listener();

        Ok(Self {
            config: config_arc,
            store,
            event_bus,
            search_service,
            job_service,
            moderation_service,
            billing_service,
            stats_service,
            log_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
