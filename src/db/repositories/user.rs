use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{profiles, users};
use crate::models::Profile;

/// Account data returned from the repository, without the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub api_key: String,
    pub is_admin: bool,
    pub profile_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            api_key: model.api_key,
            is_admin: model.is_admin,
            profile_id: model.profile_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Creates an auth account and its marketplace profile in one
    /// transaction, so signup never leaves one without the other.
    pub async fn create_with_profile(
        &self,
        username: &str,
        password: &str,
        profile: &Profile,
        security: &SecurityConfig,
    ) -> Result<(User, Profile)> {
        if self.get_by_username(username).await?.is_some() {
            anyhow::bail!("Username '{username}' is already taken");
        }

        let password_hash = hash_password(password, security).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let txn = self.conn.begin().await?;

        let profile_model = profiles::ActiveModel {
            role: Set(profile.role.as_str().to_string()),
            display_name: Set(profile.display_name.clone()),
            company_name: Set(profile.company_name.clone()),
            nickname: Set(profile.nickname.clone()),
            photo_url: Set(profile.photo_url.clone()),
            location: Set(profile.location.clone()),
            banned: Set(false),
            created_at: Set(now.clone()),
            ..Default::default()
        };
        let profile_id = profiles::Entity::insert(profile_model)
            .exec(&txn)
            .await?
            .last_insert_id;

        let user_model = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            api_key: Set(generate_api_key()),
            is_admin: Set(false),
            profile_id: Set(Some(profile_id)),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let user_id = users::Entity::insert(user_model)
            .exec(&txn)
            .await?
            .last_insert_id;

        txn.commit().await?;

        info!(username, profile_id, role = %profile.role, "Account created");

        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User {user_id} vanished after signup"))?;

        let mut created_profile = profile.clone();
        created_profile.id = profile_id;
        created_profile.banned = false;
        created_profile.created_at = now;

        Ok((User::from(user), created_profile))
    }

    /// Argon2 verification runs in `spawn_blocking`; it is CPU-bound and
    /// would stall the async runtime otherwise.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await
            .context("Failed to query user by API key")?;

        Ok(user.map(User::from))
    }

    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User '{username}' not found"))?;

        let password_hash = hash_password(new_password, security).await?;

        let active_model = users::ActiveModel {
            id: Set(user.id),
            password_hash: Set(password_hash),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        users::Entity::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn regenerate_api_key(&self, username: &str) -> Result<String> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User '{username}' not found"))?;

        let api_key = generate_api_key();

        let active_model = users::ActiveModel {
            id: Set(user.id),
            api_key: Set(api_key.clone()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        users::Entity::update(active_model).exec(&self.conn).await?;
        Ok(api_key)
    }
}

async fn hash_password(password: &str, security: &SecurityConfig) -> Result<String> {
    let params = Params::new(
        security.argon2_memory_cost_kib,
        security.argon2_time_cost,
        security.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid argon2 parameters: {e}"))?;

    let password = password.to_string();

    task::spawn_blocking(move || {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))
    })
    .await
    .context("Password hashing task panicked")?
}

fn generate_api_key() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
