use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{RwLock, broadcast};
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::entities::subscriptions;

/// Subscription management with simulated billing: the "charge" always
/// succeeds and is only logged. No payment gateway is called.
pub struct BillingService {
    store: Store,
    config: Arc<RwLock<Config>>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl BillingService {
    #[must_use]
    pub const fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            config,
            event_bus,
        }
    }

    pub async fn subscribe(
        &self,
        profile_id: i64,
        plan_name: &str,
    ) -> anyhow::Result<subscriptions::Model> {
        let (price, period_days) = {
            let config = self.config.read().await;
            let plan = config
                .billing
                .find_plan(plan_name)
                .ok_or_else(|| anyhow::anyhow!("Unknown plan '{plan_name}'"))?;
            (plan.monthly_price, config.billing.period_days)
        };

        // Simulated charge. A real gateway integration would sit here.
        info!(profile_id, plan = plan_name, price, "Simulated subscription charge accepted");

        let now = Utc::now();
        let expires_at = (now + Duration::days(period_days)).to_rfc3339();

        let subscription = self
            .store
            .start_subscription(profile_id, plan_name, Some(&expires_at), &now.to_rfc3339())
            .await?;

        let _ = self.event_bus.send(NotificationEvent::SubscriptionStarted {
            profile_id,
            plan: plan_name.to_string(),
        });

        Ok(subscription)
    }

    pub async fn cancel(&self, profile_id: i64) -> anyhow::Result<bool> {
        let cancelled = self.store.cancel_subscription(profile_id).await?;

        if cancelled {
            let _ = self
                .event_bus
                .send(NotificationEvent::SubscriptionCancelled { profile_id });
        }

        Ok(cancelled)
    }

    /// The profile's current plan; an expired or absent subscription reads
    /// as the free tier.
    pub async fn current_plan(&self, profile_id: i64) -> anyhow::Result<String> {
        let now = Utc::now().to_rfc3339();

        let current = self.store.current_subscription(profile_id).await?;
        Ok(match current {
            Some(sub) if sub.expires_at.as_deref().is_none_or(|e| e > now.as_str()) => sub.plan,
            _ => "free".to_string(),
        })
    }

    pub async fn current_subscription(
        &self,
        profile_id: i64,
    ) -> anyhow::Result<Option<subscriptions::Model>> {
        self.store.current_subscription(profile_id).await
    }
}
