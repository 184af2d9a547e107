use std::collections::HashMap;

use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use tracing::info;

use crate::entities::{prelude::*, profiles};
use crate::models::{Profile, Role};

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model_to_profile(model: profiles::Model) -> Profile {
        Profile {
            id: model.id,
            role: model.role.parse().unwrap_or(Role::Jobseeker),
            display_name: model.display_name,
            company_name: model.company_name,
            nickname: model.nickname,
            photo_url: model.photo_url,
            location: model.location,
            banned: model.banned,
            created_at: model.created_at,
        }
    }

    pub async fn create(&self, profile: &Profile) -> Result<Profile> {
        let active_model = profiles::ActiveModel {
            role: Set(profile.role.as_str().to_string()),
            display_name: Set(profile.display_name.clone()),
            company_name: Set(profile.company_name.clone()),
            nickname: Set(profile.nickname.clone()),
            photo_url: Set(profile.photo_url.clone()),
            location: Set(profile.location.clone()),
            banned: Set(false),
            created_at: Set(profile.created_at.clone()),
            ..Default::default()
        };

        let inserted = Profiles::insert(active_model).exec(&self.conn).await?;

        let mut created = profile.clone();
        created.id = inserted.last_insert_id;
        created.banned = false;
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Profile>> {
        let row = Profiles::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Self::map_model_to_profile))
    }

    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, Profile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Profiles::find()
            .filter(profiles::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|m| (m.id, Self::map_model_to_profile(m)))
            .collect())
    }

    pub async fn update(&self, profile: &Profile) -> Result<()> {
        let active_model = profiles::ActiveModel {
            id: Set(profile.id),
            role: Set(profile.role.as_str().to_string()),
            display_name: Set(profile.display_name.clone()),
            company_name: Set(profile.company_name.clone()),
            nickname: Set(profile.nickname.clone()),
            photo_url: Set(profile.photo_url.clone()),
            location: Set(profile.location.clone()),
            banned: Set(profile.banned),
            created_at: Set(profile.created_at.clone()),
        };

        Profiles::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn set_banned(&self, id: i64, banned: bool) -> Result<bool> {
        let result = Profiles::update_many()
            .col_expr(
                profiles::Column::Banned,
                sea_orm::sea_query::Expr::value(banned),
            )
            .filter(profiles::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        let changed = result.rows_affected > 0;
        if changed {
            info!(profile_id = id, banned, "Profile ban flag updated");
        }
        Ok(changed)
    }

    /// Ids of banned profiles; the search composer excludes their postings.
    pub async fn banned_ids(&self) -> Result<Vec<i64>> {
        let rows = Profiles::find()
            .filter(profiles::Column::Banned.eq(true))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|m| m.id).collect())
    }

    pub async fn count_by_role(&self, role: Role) -> Result<u64> {
        let count = Profiles::find()
            .filter(profiles::Column::Role.eq(role.as_str()))
            .count(&self.conn)
            .await?;
        Ok(count)
    }
}
