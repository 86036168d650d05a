//! Account operations behind the `/api/users` routes.
//!
//! Everything here works against the [`AccountStore`] and [`ImageHost`] traits.

use uuid::Uuid;

use crate::{
    auth::utils::{self, MIN_PASSWORD_LEN},
    images::{public_id_from_url, ImageError, ImageHost},
    store::{AccountStore, StoreError},
    users::{UpdateUser, User},
};

/// How many accounts are drawn before filtering out those already followed.
pub const SUGGESTION_SAMPLE_SIZE: i64 = 10;
/// Upper bound on suggestions returned.
pub const SUGGESTION_LIMIT: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    InvalidOperation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("store failure: {0}")]
    Store(#[source] StoreError),
    #[error(transparent)]
    ImageHost(#[from] ImageError),
    #[error("password hashing failed: {0}")]
    Hashing(anyhow::Error),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => already_taken(),
            other => AccountError::Store(other),
        }
    }
}

fn user_not_found() -> AccountError {
    AccountError::NotFound("User not found".to_string())
}

fn already_taken() -> AccountError {
    AccountError::InvalidInput("Username or email is already taken".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
}

pub async fn profile_by_username(
    store: &dyn AccountStore,
    username: &str,
) -> Result<User, AccountError> {
    store
        .find_by_username(username)
        .await?
        .ok_or_else(user_not_found)
}

/// Toggles whether `actor` follows `target`.
///
/// Following writes one `follow` notification for the target; unfollowing writes none.
pub async fn follow_or_unfollow(
    store: &dyn AccountStore,
    actor: Uuid,
    target: Uuid,
) -> Result<FollowOutcome, AccountError> {
    if actor == target {
        return Err(AccountError::InvalidOperation(
            "You can't follow/unfollow yourself".to_string(),
        ));
    }

    store.find_by_id(actor).await?.ok_or_else(user_not_found)?;
    store.find_by_id(target).await?.ok_or_else(user_not_found)?;

    let outcome = store.toggle_follow(actor, target).await?;
    tracing::debug!(%actor, %target, ?outcome, "follow toggled");
    Ok(outcome)
}

/// Keeps sampled accounts that are neither `actor` nor already followed, up to [`SUGGESTION_LIMIT`].
pub fn select_suggestions(actor: Uuid, following: &[Uuid], sample: Vec<User>) -> Vec<User> {
    sample
        .into_iter()
        .filter(|u| u.id != actor && !following.contains(&u.id))
        .take(SUGGESTION_LIMIT)
        .collect()
}

/// Up to four accounts `actor` does not follow yet, picked from a random sample of ten.
///
/// No resampling happens, so the result may be shorter than four or empty.
pub async fn suggested_accounts(
    store: &dyn AccountStore,
    actor: Uuid,
) -> Result<Vec<User>, AccountError> {
    let current = store.find_by_id(actor).await?.ok_or_else(user_not_found)?;
    let sample = store
        .sample_excluding(actor, SUGGESTION_SAMPLE_SIZE)
        .await?;
    Ok(select_suggestions(actor, &current.following, sample))
}

async fn replace_image(
    images: &dyn ImageHost,
    old_url: &str,
    new_image: &str,
) -> Result<String, AccountError> {
    if let Some(public_id) = public_id_from_url(old_url) {
        images.destroy(public_id).await?;
    }
    Ok(images.upload(new_image).await?)
}

/// Fails if `owner` is an account other than `actor`.
fn ensure_unclaimed(owner: Option<User>, actor: Uuid) -> Result<(), AccountError> {
    match owner {
        Some(owner) if owner.id != actor => Err(already_taken()),
        _ => Ok(()),
    }
}

/// Applies a partial profile update for `actor`.
///
/// `changes` is expected to be normalized: `None` means "leave as is".
/// Every check runs before the image host is touched.
pub async fn update_profile(
    store: &dyn AccountStore,
    images: &dyn ImageHost,
    actor: Uuid,
    changes: UpdateUser,
) -> Result<User, AccountError> {
    let mut user = store.find_by_id(actor).await?.ok_or_else(user_not_found)?;

    match (
        changes.current_password.as_deref(),
        changes.new_password.as_deref(),
    ) {
        (Some(current), Some(new)) => {
            if !utils::password_matches(&user.password_hash, current) {
                return Err(AccountError::Unauthorized(
                    "Current password is incorrect".to_string(),
                ));
            }
            if new.chars().count() < MIN_PASSWORD_LEN {
                return Err(AccountError::InvalidInput(format!(
                    "Password must be at least {} characters long",
                    MIN_PASSWORD_LEN
                )));
            }
            user.password_hash = utils::hash_password(new).map_err(AccountError::Hashing)?;
        }
        (None, None) => {}
        _ => {
            return Err(AccountError::InvalidInput(
                "Please provide both current password and new password".to_string(),
            ))
        }
    }

    if let Some(username) = changes.username.as_deref() {
        ensure_unclaimed(store.find_by_username(username).await?, actor)?;
    }
    if let Some(email) = changes.email.as_deref() {
        ensure_unclaimed(store.find_by_email(email).await?, actor)?;
    }

    if let Some(image) = changes.profile_img.as_deref() {
        user.profile_img = replace_image(images, &user.profile_img, image).await?;
    }
    if let Some(image) = changes.cover_img.as_deref() {
        user.cover_img = replace_image(images, &user.cover_img, image).await?;
    }

    if let Some(full_name) = changes.full_name {
        user.full_name = full_name;
    }
    if let Some(email) = changes.email {
        user.email = email;
    }
    if let Some(username) = changes.username {
        user.username = username;
    }
    if let Some(bio) = changes.bio {
        user.bio = bio;
    }
    if let Some(link) = changes.link {
        user.link = link;
    }

    Ok(store.save_profile(&user).await?)
}
