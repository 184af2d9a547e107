use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::{prelude::*, saved_jobs};

pub struct SavedJobRepository {
    conn: DatabaseConnection,
}

impl SavedJobRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn save(&self, profile_id: i64, job_id: i64, now: &str) -> Result<bool> {
        let existing = SavedJobs::find()
            .filter(saved_jobs::Column::ProfileId.eq(profile_id))
            .filter(saved_jobs::Column::JobId.eq(job_id))
            .one(&self.conn)
            .await?;

        if existing.is_some() {
            return Ok(false);
        }

        let active_model = saved_jobs::ActiveModel {
            profile_id: Set(profile_id),
            job_id: Set(job_id),
            created_at: Set(now.to_string()),
            ..Default::default()
        };

        SavedJobs::insert(active_model).exec(&self.conn).await?;
        Ok(true)
    }

    pub async fn unsave(&self, profile_id: i64, job_id: i64) -> Result<bool> {
        let result = SavedJobs::delete_many()
            .filter(saved_jobs::Column::ProfileId.eq(profile_id))
            .filter(saved_jobs::Column::JobId.eq(job_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn job_ids_for_profile(&self, profile_id: i64) -> Result<Vec<i64>> {
        let rows = SavedJobs::find()
            .filter(saved_jobs::Column::ProfileId.eq(profile_id))
            .order_by_desc(saved_jobs::Column::CreatedAt)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|m| m.job_id).collect())
    }

    pub async fn is_saved(&self, profile_id: i64, job_id: i64) -> Result<bool> {
        let existing = SavedJobs::find()
            .filter(saved_jobs::Column::ProfileId.eq(profile_id))
            .filter(saved_jobs::Column::JobId.eq(job_id))
            .one(&self.conn)
            .await?;

        Ok(existing.is_some())
    }
}
