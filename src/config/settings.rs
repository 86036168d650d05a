use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

#[derive(Clone)]
pub struct Settings {
    pub port: u16,
    pub addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    /// Sets the `Secure` attribute on the auth cookie. Off for local http development.
    pub cookie_secure: bool,
    pub cloudinary: CloudinarySettings,
}

#[derive(Clone)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

impl Settings {
    pub fn new() -> Result<Self> {
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            port,
            addr,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            cookie_secure,
            cloudinary: CloudinarySettings {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
            },
        })
    }
}
