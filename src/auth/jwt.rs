use anyhow::Result;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization, Cookie},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::settings::Settings, error::AppError};

pub const COOKIE_NAME: &str = "jwt";
pub const TOKEN_TTL_DAYS: i64 = 15;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

pub fn create_token(user_id: Uuid, secret: &str) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        iat: now.timestamp(),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// `Set-Cookie` value carrying `token` for the lifetime of the token.
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        COOKIE_NAME,
        token,
        Duration::days(TOKEN_TTL_DAYS).num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the session cookie.
pub fn cleared_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", COOKIE_NAME)
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
    Settings: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Bearer header first, then the session cookie set at login
        let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
            Err(_) => {
                let TypedHeader(cookie) = parts
                    .extract::<TypedHeader<Cookie>>()
                    .await
                    .map_err(|_| AppError::Unauthorized)?;
                cookie
                    .get(COOKIE_NAME)
                    .filter(|v| !v.is_empty())
                    .ok_or(AppError::Unauthorized)?
                    .to_string()
            }
        };

        let settings = Settings::from_ref(state);

        let token = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(settings.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        Ok(token.claims)
    }
}
