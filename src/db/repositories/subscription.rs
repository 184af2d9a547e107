use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{prelude::*, subscriptions};

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_CANCELLED: &str = "cancelled";

pub struct SubscriptionRepository {
    conn: DatabaseConnection,
}

impl SubscriptionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The profile's most recent active subscription, if any.
    pub async fn current_for_profile(
        &self,
        profile_id: i64,
    ) -> Result<Option<subscriptions::Model>> {
        let row = Subscriptions::find()
            .filter(subscriptions::Column::ProfileId.eq(profile_id))
            .filter(subscriptions::Column::Status.eq(STATUS_ACTIVE))
            .order_by_desc(subscriptions::Column::StartedAt)
            .order_by_desc(subscriptions::Column::Id)
            .one(&self.conn)
            .await?;
        Ok(row)
    }

    /// Starts a subscription, cancelling any active one first so a profile
    /// holds at most one active plan.
    pub async fn start(
        &self,
        profile_id: i64,
        plan: &str,
        expires_at: Option<&str>,
        now: &str,
    ) -> Result<subscriptions::Model> {
        self.cancel(profile_id).await?;

        let active_model = subscriptions::ActiveModel {
            profile_id: Set(profile_id),
            plan: Set(plan.to_string()),
            status: Set(STATUS_ACTIVE.to_string()),
            started_at: Set(now.to_string()),
            expires_at: Set(expires_at.map(String::from)),
            created_at: Set(now.to_string()),
            ..Default::default()
        };

        let inserted = Subscriptions::insert(active_model).exec(&self.conn).await?;

        let row = Subscriptions::find_by_id(inserted.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!("Subscription {} vanished after insert", inserted.last_insert_id)
            })?;

        info!(profile_id, plan, "Subscription started");
        Ok(row)
    }

    pub async fn cancel(&self, profile_id: i64) -> Result<bool> {
        let result = Subscriptions::update_many()
            .col_expr(
                subscriptions::Column::Status,
                sea_orm::sea_query::Expr::value(STATUS_CANCELLED),
            )
            .filter(subscriptions::Column::ProfileId.eq(profile_id))
            .filter(subscriptions::Column::Status.eq(STATUS_ACTIVE))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
