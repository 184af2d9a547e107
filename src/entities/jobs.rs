use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_period: String,
    /// Annual-equivalent salary bounds, maintained on every write so search
    /// can compare across pay frequencies without recomputing.
    pub annual_min: Option<f64>,
    pub annual_max: Option<f64>,
    pub job_type: String,
    pub experience_level: String,
    pub no_experience_required: bool,
    pub training_provided: bool,
    pub tradespeople_job: bool,
    pub is_active: bool,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub poster_id: i64,
    pub poster_kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::PosterId",
        to = "super::profiles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Profiles,
    #[sea_orm(has_many = "super::saved_jobs::Entity")]
    SavedJobs,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profiles.def()
    }
}

impl Related<super::saved_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedJobs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
