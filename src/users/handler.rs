use axum::{extract::State, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::jwt,
    error::AppError,
    extract::{self, Path},
    images::DynImageHost,
    response::MessageResponse,
    store::DynStore,
    users::{
        service::{self, FollowOutcome},
        UpdateUser, UserResponse,
    },
};

/// Get a user profile
/// GET /api/users/profile/:username
pub async fn get_user_profile(
    State(store): State<DynStore>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = service::profile_by_username(store.as_ref(), &username).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Follow or unfollow a user, depending on the current relationship
/// POST /api/users/follow/:id
pub async fn follow_unfollow_user(
    State(store): State<DynStore>,
    claims: jwt::Claims,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = service::follow_or_unfollow(store.as_ref(), claims.sub, user_id).await?;

    let message = match outcome {
        FollowOutcome::Followed => "User followed successfully",
        FollowOutcome::Unfollowed => "User unfollowed successfully",
    };

    Ok(MessageResponse::new(message))
}

/// Get up to four accounts the current user does not follow yet
/// GET /api/users/suggested
pub async fn get_suggested_users(
    State(store): State<DynStore>,
    claims: jwt::Claims,
) -> Result<impl IntoResponse, AppError> {
    let users = service::suggested_accounts(store.as_ref(), claims.sub).await?;

    let response: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(response))
}

/// Update the current user's profile
/// POST /api/users/update
pub async fn update_user(
    State(store): State<DynStore>,
    State(images): State<DynImageHost>,
    claims: jwt::Claims,
    extract::Json(payload): extract::Json<UpdateUser>,
) -> Result<impl IntoResponse, AppError> {
    let changes = payload.normalized();
    changes
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user =
        service::update_profile(store.as_ref(), images.as_ref(), claims.sub, changes).await?;

    tracing::info!(user_id = %user.id, "profile updated");

    Ok(Json(UserResponse::from(user)))
}
