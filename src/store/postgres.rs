use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    notifications::Notification,
    store::{AccountStore, StoreError},
    users::{service::FollowOutcome, User},
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn classify(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique field").to_string();
            return StoreError::Conflict(constraint);
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn insert(&self, user: &User) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, full_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn save_profile(&self, user: &User) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, full_name = $5,
                bio = $6, link = $7, profile_img = $8, cover_img = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.bio)
        .bind(&user.link)
        .bind(&user.profile_img)
        .bind(&user.cover_img)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn sample_excluding(&self, exclude: Uuid, size: i64) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id <> $1 ORDER BY random() LIMIT $2")
            .bind(exclude)
            .bind(size)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn toggle_follow(
        &self,
        follower: Uuid,
        target: Uuid,
    ) -> Result<FollowOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        // Rows are locked in id order so crossing toggles between two accounts cannot deadlock
        let locked: Vec<(Uuid, Vec<Uuid>)> = sqlx::query_as(
            "SELECT id, following FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(vec![follower, target])
        .fetch_all(&mut *tx)
        .await
        .map_err(classify)?;

        if !locked.iter().any(|(id, _)| *id == target) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        let following = locked
            .into_iter()
            .find_map(|(id, following)| (id == follower).then_some(following))
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;

        let outcome = if following.contains(&target) {
            sqlx::query(
                "UPDATE users SET followers = array_remove(followers, $1), updated_at = NOW() WHERE id = $2",
            )
            .bind(follower)
            .bind(target)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

            sqlx::query(
                "UPDATE users SET following = array_remove(following, $2), updated_at = NOW() WHERE id = $1",
            )
            .bind(follower)
            .bind(target)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

            FollowOutcome::Unfollowed
        } else {
            sqlx::query(
                "UPDATE users SET followers = array_append(followers, $1), updated_at = NOW() WHERE id = $2",
            )
            .bind(follower)
            .bind(target)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

            sqlx::query(
                "UPDATE users SET following = array_append(following, $2), updated_at = NOW() WHERE id = $1",
            )
            .bind(follower)
            .bind(target)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

            let notification = Notification::follow(follower, target);
            sqlx::query(
                r#"
                INSERT INTO notifications (id, type, from_user, to_user, read, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(notification.id)
            .bind(notification.kind)
            .bind(notification.from_user)
            .bind(notification.to_user)
            .bind(notification.read)
            .bind(notification.created_at)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

            FollowOutcome::Followed
        };

        tx.commit().await.map_err(classify)?;
        Ok(outcome)
    }
}
