use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    auth::{jwt, utils, AuthResponse, LoginUser, RegisterUser},
    config::settings::Settings,
    error::AppError,
    extract,
    response::MessageResponse,
    store::{DynStore, StoreError},
    users::{User, UserResponse},
};

pub async fn signup(
    State(store): State<DynStore>,
    State(settings): State<Settings>,
    extract::Json(payload): extract::Json<RegisterUser>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let password_hash = utils::hash_password(&payload.password).map_err(|e| {
        tracing::error!("Error in signup: {:?}", e);
        AppError::InternalServerError
    })?;

    let user = User::new(
        payload.username,
        payload.email,
        password_hash,
        payload.full_name,
    );

    let user = store.insert(&user).await.map_err(|e| match e {
        StoreError::Conflict(_) => {
            AppError::BadRequest("Username or email is already taken".to_string())
        }
        StoreError::Database(e) => {
            tracing::error!("Database error: {:?}", e);
            AppError::InternalServerError
        }
    })?;

    let token = jwt::create_token(user.id, &settings.jwt_secret)
        .map_err(|_| AppError::InternalServerError)?;

    tracing::info!(user_id = %user.id, "account created");

    Ok((
        StatusCode::CREATED,
        [(
            header::SET_COOKIE,
            jwt::session_cookie(&token, settings.cookie_secure),
        )],
        Json(AuthResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}

pub async fn login(
    State(store): State<DynStore>,
    State(settings): State<Settings>,
    extract::Json(payload): extract::Json<LoginUser>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::BadRequest("Invalid username or password".to_string());

    let user = store
        .find_by_username(&payload.username)
        .await
        .map_err(|e| {
            tracing::error!("Database error: {:?}", e);
            AppError::InternalServerError
        })?
        .ok_or_else(invalid)?;

    if !utils::password_matches(&user.password_hash, &payload.password) {
        return Err(invalid());
    }

    let token = jwt::create_token(user.id, &settings.jwt_secret)
        .map_err(|_| AppError::InternalServerError)?;

    Ok((
        [(
            header::SET_COOKIE,
            jwt::session_cookie(&token, settings.cookie_secure),
        )],
        Json(AuthResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}

pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, jwt::cleared_cookie())],
        MessageResponse::new("Logged out successfully"),
    )
}

pub async fn get_me(
    State(store): State<DynStore>,
    claims: jwt::Claims,
) -> Result<impl IntoResponse, AppError> {
    let user = store
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("Database error: {:?}", e);
            AppError::InternalServerError
        })?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}
