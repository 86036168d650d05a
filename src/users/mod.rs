use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub mod handler;
pub mod service;

/// Database model for an account, including both sides of the follow graph
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub bio: String,
    pub link: String,
    pub profile_img: String,
    pub cover_img: String,
    pub following: Vec<Uuid>,
    pub followers: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String, full_name: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            full_name,
            bio: String::new(),
            link: String::new(),
            profile_img: String::new(),
            cover_img: String::new(),
            following: Vec::new(),
            followers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub bio: String,
    pub link: String,
    pub profile_img: String,
    pub cover_img: String,
    pub following: Vec<Uuid>,
    pub followers: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            bio: user.bio,
            link: user.link,
            profile_img: user.profile_img,
            cover_img: user.cover_img,
            following: user.following,
            followers: user.followers,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request payload for a partial profile update.
///
/// Empty strings are treated the same as absent fields, see [`UpdateUser::normalized`].
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    pub username: Option<String>,
    pub bio: Option<String>,
    pub link: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub profile_img: Option<String>,
    pub cover_img: Option<String>,
}

fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl UpdateUser {
    /// Drops empty values so that only fields with content take part in the update.
    pub fn normalized(self) -> Self {
        Self {
            full_name: provided(self.full_name),
            email: provided(self.email),
            username: provided(self.username),
            bio: provided(self.bio),
            link: provided(self.link),
            current_password: provided(self.current_password),
            new_password: provided(self.new_password),
            profile_img: provided(self.profile_img),
            cover_img: provided(self.cover_img),
        }
    }
}
