use std::collections::HashMap;

use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::{prelude::*, ratings};
use crate::search::RatingSummary;

pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Records a rating. A rater gets one rating per poster; rating again
    /// replaces the earlier one.
    pub async fn rate(
        &self,
        rated_id: i64,
        rater_id: i64,
        stars: i32,
        comment: Option<&str>,
        now: &str,
    ) -> Result<()> {
        let existing = Ratings::find()
            .filter(ratings::Column::RatedId.eq(rated_id))
            .filter(ratings::Column::RaterId.eq(rater_id))
            .one(&self.conn)
            .await?;

        match existing {
            Some(row) => {
                let active_model = ratings::ActiveModel {
                    id: Set(row.id),
                    rated_id: Set(rated_id),
                    rater_id: Set(rater_id),
                    stars: Set(stars),
                    comment: Set(comment.map(String::from)),
                    created_at: Set(now.to_string()),
                };
                Ratings::update(active_model).exec(&self.conn).await?;
            }
            None => {
                let active_model = ratings::ActiveModel {
                    rated_id: Set(rated_id),
                    rater_id: Set(rater_id),
                    stars: Set(stars),
                    comment: Set(comment.map(String::from)),
                    created_at: Set(now.to_string()),
                    ..Default::default()
                };
                Ratings::insert(active_model).exec(&self.conn).await?;
            }
        }

        Ok(())
    }

    pub async fn list_for_profile(&self, rated_id: i64) -> Result<Vec<ratings::Model>> {
        let rows = Ratings::find()
            .filter(ratings::Column::RatedId.eq(rated_id))
            .order_by_desc(ratings::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Batch aggregate lookup keyed by rated profile id. Profiles without a
    /// single rating simply have no entry; callers default to 0/0.
    pub async fn summaries_for(&self, rated_ids: &[i64]) -> Result<HashMap<i64, RatingSummary>> {
        if rated_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Ratings::find()
            .filter(ratings::Column::RatedId.is_in(rated_ids.iter().copied()))
            .all(&self.conn)
            .await?;

        let mut totals: HashMap<i64, (i64, i64)> = HashMap::new();
        for row in rows {
            let entry = totals.entry(row.rated_id).or_insert((0, 0));
            entry.0 += i64::from(row.stars);
            entry.1 += 1;
        }

        Ok(totals
            .into_iter()
            .map(|(id, (sum, count))| {
                #[allow(clippy::cast_precision_loss)]
                let average = sum as f64 / count as f64;
                (id, RatingSummary { average, count })
            })
            .collect())
    }

    pub async fn summary_for(&self, rated_id: i64) -> Result<RatingSummary> {
        let summaries = self.summaries_for(&[rated_id]).await?;
        Ok(summaries.get(&rated_id).copied().unwrap_or_default())
    }
}
