use crate::{leads, users};
use async_trait::async_trait;
use heights_core::{
    error::Result,
    traits::{LeadStore, UserStore},
    types::{Lead, LeadId, NewLead, NewUser, UserId, UserProfile},
};
use sqlx::SqlitePool;

/// Local storage context using `SQLite`
#[derive(Clone)]
pub struct LocalStorageContext {
    pool: SqlitePool,
}

impl LocalStorageContext {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect, create the file if needed, and apply migrations
    pub async fn connect(database_url: &str) -> crate::Result<Self> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LeadStore for LocalStorageContext {
    async fn create_lead(&self, lead: NewLead) -> Result<Lead> {
        Ok(leads::create(&self.pool, lead).await?)
    }

    async fn get_lead(&self, id: &LeadId) -> Result<Option<Lead>> {
        Ok(leads::get_by_id(&self.pool, id).await?)
    }

    async fn list_leads(&self, limit: u32) -> Result<Vec<Lead>> {
        Ok(leads::list_recent(&self.pool, limit).await?)
    }

    async fn count_leads(&self) -> Result<u64> {
        Ok(leads::count(&self.pool).await?)
    }
}

#[async_trait]
impl UserStore for LocalStorageContext {
    async fn create_user(&self, user: NewUser, password_hash: &str) -> Result<UserProfile> {
        Ok(users::create(&self.pool, user, password_hash).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        Ok(users::find_by_email(&self.pool, email).await?)
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>> {
        Ok(users::get_by_id(&self.pool, id).await?)
    }

    async fn password_hash(&self, id: &UserId) -> Result<Option<String>> {
        Ok(users::get_password_hash(&self.pool, id).await?)
    }
}
