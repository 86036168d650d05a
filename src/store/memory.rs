use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::{
    notifications::Notification,
    store::{AccountStore, StoreError},
    users::{service::FollowOutcome, User},
};

/// In-process store used by tests.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn put(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn get(&self, id: Uuid) -> User {
        self.users.lock().unwrap()[&id].clone()
    }

    /// Directly sets `follower` as following `target` on both sides, without a notification.
    pub fn link(&self, follower: Uuid, target: Uuid) {
        let mut users = self.users.lock().unwrap();
        users.get_mut(&follower).unwrap().following.push(target);
        users.get_mut(&target).unwrap().followers.push(follower);
    }

    fn check_unique(users: &HashMap<Uuid, User>, user: &User) -> Result<(), StoreError> {
        for other in users.values().filter(|u| u.id != user.id) {
            if other.username == user.username {
                return Err(StoreError::Conflict("users_username_key".to_string()));
            }
            if other.email == user.email {
                return Err(StoreError::Conflict("users_email_key".to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, user)?;
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn save_profile(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, user)?;
        let stored = users
            .get_mut(&user.id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.full_name = user.full_name.clone();
        stored.bio = user.bio.clone();
        stored.link = user.link.clone();
        stored.profile_img = user.profile_img.clone();
        stored.cover_img = user.cover_img.clone();
        stored.updated_at = chrono::Utc::now();
        Ok(stored.clone())
    }

    async fn sample_excluding(&self, exclude: Uuid, size: i64) -> Result<Vec<User>, StoreError> {
        let mut others: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.id != exclude)
            .cloned()
            .collect();
        others.shuffle(&mut rand::thread_rng());
        others.truncate(size.max(0) as usize);
        Ok(others)
    }

    async fn toggle_follow(
        &self,
        follower: Uuid,
        target: Uuid,
    ) -> Result<FollowOutcome, StoreError> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&follower) || !users.contains_key(&target) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }

        let following = &mut users.get_mut(&follower).unwrap().following;
        if following.contains(&target) {
            following.retain(|id| *id != target);
            users
                .get_mut(&target)
                .unwrap()
                .followers
                .retain(|id| *id != follower);
            Ok(FollowOutcome::Unfollowed)
        } else {
            following.push(target);
            users.get_mut(&target).unwrap().followers.push(follower);
            self.notifications
                .lock()
                .unwrap()
                .push(Notification::follow(follower, target));
            Ok(FollowOutcome::Followed)
        }
    }
}
