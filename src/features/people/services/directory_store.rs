use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{classify_db_error, Result};
use crate::features::people::models::{Invitation, Profile};

/// Read access to the profile and invitation tables
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    async fn list_invitations(&self) -> Result<Vec<Invitation>>;
}

pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        sqlx::query_as::<_, Profile>(
            "SELECT id, email, first_name, last_name, user_type
             FROM profiles
             ORDER BY first_name ASC NULLS LAST, last_name ASC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify_db_error)
    }

    async fn list_invitations(&self) -> Result<Vec<Invitation>> {
        sqlx::query_as::<_, Invitation>("SELECT id, email, user_type, role FROM invitations")
            .fetch_all(&self.pool)
            .await
            .map_err(classify_db_error)
    }
}
