use anyhow::Result;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{info, warn};

use crate::entities::{jobs, prelude::*};
use crate::models::{Job, PosterKind, SalaryPeriod};
use crate::search::compose::{ComposedQuery, salary_admits, salary_condition};

pub struct JobRepository {
    conn: DatabaseConnection,
}

impl JobRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model_to_job(model: jobs::Model) -> Job {
        Job {
            id: model.id,
            title: model.title,
            description: model.description,
            location: model.location,
            latitude: model.latitude,
            longitude: model.longitude,
            salary_min: model.salary_min,
            salary_max: model.salary_max,
            salary_period: model.salary_period.parse().unwrap_or_default(),
            annual_min: model.annual_min,
            annual_max: model.annual_max,
            job_type: model.job_type,
            experience_level: model.experience_level,
            no_experience_required: model.no_experience_required,
            training_provided: model.training_provided,
            tradespeople_job: model.tradespeople_job,
            is_active: model.is_active,
            expires_at: model.expires_at,
            created_at: model.created_at,
            poster_id: model.poster_id,
            poster_kind: model
                .poster_kind
                .parse()
                .unwrap_or(PosterKind::Company),
        }
    }

    pub async fn create(&self, job: &Job) -> Result<Job> {
        let active_model = jobs::ActiveModel {
            title: Set(job.title.clone()),
            description: Set(job.description.clone()),
            location: Set(job.location.clone()),
            latitude: Set(job.latitude),
            longitude: Set(job.longitude),
            salary_min: Set(job.salary_min),
            salary_max: Set(job.salary_max),
            salary_period: Set(job.salary_period.as_str().to_string()),
            annual_min: Set(job.annual_min),
            annual_max: Set(job.annual_max),
            job_type: Set(job.job_type.clone()),
            experience_level: Set(job.experience_level.clone()),
            no_experience_required: Set(job.no_experience_required),
            training_provided: Set(job.training_provided),
            tradespeople_job: Set(job.tradespeople_job),
            is_active: Set(job.is_active),
            expires_at: Set(job.expires_at.clone()),
            created_at: Set(job.created_at.clone()),
            poster_id: Set(job.poster_id),
            poster_kind: Set(job.poster_kind.as_str().to_string()),
            ..Default::default()
        };

        let inserted = Jobs::insert(active_model).exec(&self.conn).await?;

        info!(job_id = inserted.last_insert_id, title = %job.title, "Job posted");

        let mut created = job.clone();
        created.id = inserted.last_insert_id;
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Job>> {
        let row = Jobs::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Self::map_model_to_job))
    }

    pub async fn update(&self, job: &Job) -> Result<()> {
        let active_model = jobs::ActiveModel {
            id: Set(job.id),
            title: Set(job.title.clone()),
            description: Set(job.description.clone()),
            location: Set(job.location.clone()),
            latitude: Set(job.latitude),
            longitude: Set(job.longitude),
            salary_min: Set(job.salary_min),
            salary_max: Set(job.salary_max),
            salary_period: Set(job.salary_period.as_str().to_string()),
            annual_min: Set(job.annual_min),
            annual_max: Set(job.annual_max),
            job_type: Set(job.job_type.clone()),
            experience_level: Set(job.experience_level.clone()),
            no_experience_required: Set(job.no_experience_required),
            training_provided: Set(job.training_provided),
            tradespeople_job: Set(job.tradespeople_job),
            is_active: Set(job.is_active),
            expires_at: Set(job.expires_at.clone()),
            created_at: Set(job.created_at.clone()),
            poster_id: Set(job.poster_id),
            poster_kind: Set(job.poster_kind.as_str().to_string()),
        };

        Jobs::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn list_for_poster(&self, poster_id: i64) -> Result<Vec<Job>> {
        let rows = Jobs::find()
            .filter(jobs::Column::PosterId.eq(poster_id))
            .order_by_desc(jobs::Column::CreatedAt)
            .order_by_desc(jobs::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model_to_job).collect())
    }

    pub async fn set_active(&self, id: i64, active: bool) -> Result<()> {
        Jobs::update_many()
            .col_expr(
                jobs::Column::IsActive,
                sea_orm::sea_query::Expr::value(active),
            )
            .filter(jobs::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_expiry(&self, id: i64, expires_at: Option<&str>) -> Result<()> {
        Jobs::update_many()
            .col_expr(
                jobs::Column::ExpiresAt,
                sea_orm::sea_query::Expr::value(expires_at),
            )
            .filter(jobs::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, id: i64) -> Result<bool> {
        let result = Jobs::delete_by_id(id).exec(&self.conn).await?;
        let removed = result.rows_affected > 0;
        if removed {
            info!(job_id = id, "Job deleted");
        }
        Ok(removed)
    }

    /// Executes a composed search. The indexed salary path runs first; when
    /// it errors and salary bounds are present, the recompute fallback pulls
    /// the candidates and intersects by id in application code.
    pub async fn search(&self, query: &ComposedQuery) -> Result<Vec<Job>> {
        match self.run_indexed(query).await {
            Ok(rows) => Ok(rows),
            Err(e) => {
                if let Some(bounds) = query.salary {
                    warn!(error = %e, "Indexed salary comparison unavailable, recomputing annual bounds");
                    self.run_recomputed(query, bounds).await
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn run_indexed(&self, query: &ComposedQuery) -> Result<Vec<Job>, sea_orm::DbErr> {
        let mut condition = query.filter.clone();
        if let Some(bounds) = &query.salary {
            condition = condition.add(salary_condition(bounds));
        }

        let mut find = Jobs::find()
            .filter(condition)
            .order_by_desc(jobs::Column::CreatedAt)
            .order_by_desc(jobs::Column::Id);

        if let Some(limit) = query.fetch_limit {
            find = find.limit(limit);
        }

        let rows = find.all(&self.conn).await?;
        Ok(rows.into_iter().map(Self::map_model_to_job).collect())
    }

    async fn run_recomputed(
        &self,
        query: &ComposedQuery,
        bounds: crate::search::SalaryBounds,
    ) -> Result<Vec<Job>> {
        let candidates = Jobs::find()
            .filter(query.filter.clone())
            .all(&self.conn)
            .await?;

        let ids: Vec<i64> = candidates
            .iter()
            .filter(|m| {
                let period: SalaryPeriod = m.salary_period.parse().unwrap_or_default();
                let annual_min = m.salary_min.map(|v| period.to_annual(v));
                let annual_max = m.salary_max.map(|v| period.to_annual(v));
                salary_admits(&bounds, annual_min, annual_max)
            })
            .map(|m| m.id)
            .collect();

        // Zero surviving ids must force an empty result, never a query with
        // the salary filter silently dropped.
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let condition = Condition::all()
            .add(query.filter.clone())
            .add(jobs::Column::Id.is_in(ids));

        let mut find = Jobs::find()
            .filter(condition)
            .order_by_desc(jobs::Column::CreatedAt)
            .order_by_desc(jobs::Column::Id);

        if let Some(limit) = query.fetch_limit {
            find = find.limit(limit);
        }

        let rows = find.all(&self.conn).await?;
        Ok(rows.into_iter().map(Self::map_model_to_job).collect())
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(Jobs::find().count(&self.conn).await?)
    }

    pub async fn count_active(&self, now: &str) -> Result<u64> {
        let count = Jobs::find()
            .filter(
                Condition::all()
                    .add(jobs::Column::IsActive.eq(true))
                    .add(
                        Condition::any()
                            .add(jobs::Column::ExpiresAt.is_null())
                            .add(jobs::Column::ExpiresAt.gt(now)),
                    ),
            )
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn count_expired(&self, now: &str) -> Result<u64> {
        let count = Jobs::find()
            .filter(
                Condition::all()
                    .add(jobs::Column::IsActive.eq(true))
                    .add(jobs::Column::ExpiresAt.lte(now)),
            )
            .count(&self.conn)
            .await?;
        Ok(count)
    }
}
