use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::users::{service::FollowOutcome, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub type DynStore = Arc<dyn AccountStore>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint (username or email) rejected the write.
    #[error("duplicate value for {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

/// Persistence for accounts, the follow graph stored on them, and notifications.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: &User) -> Result<User, StoreError>;

    /// Writes the profile fields and password hash of `user`. The follow sets are left alone.
    async fn save_profile(&self, user: &User) -> Result<User, StoreError>;

    /// Uniform random sample of at most `size` accounts other than `exclude`.
    async fn sample_excluding(&self, exclude: Uuid, size: i64) -> Result<Vec<User>, StoreError>;

    /// Flips whether `follower` follows `target`, deciding from the stored state.
    ///
    /// Both sides of the relationship change together. Following also records one
    /// `follow` notification for the target; unfollowing records none.
    async fn toggle_follow(
        &self,
        follower: Uuid,
        target: Uuid,
    ) -> Result<FollowOutcome, StoreError>;
}
