use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{prelude::*, reports};

pub const STATUS_OPEN: &str = "open";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_DISMISSED: &str = "dismissed";

pub struct ReportRepository {
    conn: DatabaseConnection,
}

impl ReportRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn file(
        &self,
        reporter_id: i64,
        reported_id: i64,
        reason: &str,
        now: &str,
    ) -> Result<reports::Model> {
        let active_model = reports::ActiveModel {
            reporter_id: Set(reporter_id),
            reported_id: Set(reported_id),
            reason: Set(reason.to_string()),
            status: Set(STATUS_OPEN.to_string()),
            resolution: Set(None),
            created_at: Set(now.to_string()),
            updated_at: Set(now.to_string()),
            ..Default::default()
        };

        let inserted = Reports::insert(active_model).exec(&self.conn).await?;

        let row = Reports::find_by_id(inserted.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Report {} vanished after insert", inserted.last_insert_id))?;

        info!(report_id = row.id, reported_id, "User report filed");
        Ok(row)
    }

    pub async fn get(&self, id: i64) -> Result<Option<reports::Model>> {
        Ok(Reports::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn list(&self, status: Option<&str>) -> Result<Vec<reports::Model>> {
        let mut query = Reports::find().order_by_desc(reports::Column::CreatedAt);

        if let Some(status) = status {
            query = query.filter(reports::Column::Status.eq(status));
        }

        Ok(query.all(&self.conn).await?)
    }

    pub async fn set_status(
        &self,
        id: i64,
        status: &str,
        resolution: Option<&str>,
        now: &str,
    ) -> Result<bool> {
        let Some(row) = Reports::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let active_model = reports::ActiveModel {
            id: Set(row.id),
            reporter_id: Set(row.reporter_id),
            reported_id: Set(row.reported_id),
            reason: Set(row.reason),
            status: Set(status.to_string()),
            resolution: Set(resolution.map(String::from)),
            created_at: Set(row.created_at),
            updated_at: Set(now.to_string()),
        };

        Reports::update(active_model).exec(&self.conn).await?;
        info!(report_id = id, status, "Report status updated");
        Ok(true)
    }

    pub async fn open_count(&self) -> Result<u64> {
        let count = Reports::find()
            .filter(reports::Column::Status.eq(STATUS_OPEN))
            .count(&self.conn)
            .await?;
        Ok(count)
    }
}
