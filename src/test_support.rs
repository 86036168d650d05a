use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use uuid::Uuid;

use crate::{
    app,
    auth::{jwt, utils},
    config::settings::{CloudinarySettings, Settings},
    images::fake::RecordingImageHost,
    store::memory::MemoryStore,
    users::User,
    AppState,
};

const JWT_SECRET: &str = "test-secret";

/// Router wired to an in-memory store and a recording image host.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub images: Arc<RecordingImageHost>,
    settings: Settings,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            images: Arc::new(RecordingImageHost::new()),
            settings: Settings {
                port: 0,
                addr: SocketAddr::from(([127, 0, 0, 1], 0)),
                database_url: String::new(),
                jwt_secret: JWT_SECRET.to_string(),
                cookie_secure: false,
                cloudinary: CloudinarySettings {
                    cloud_name: "demo".to_string(),
                    api_key: "key".to_string(),
                    api_secret: "secret".to_string(),
                },
            },
        }
    }

    pub fn router(&self) -> Router {
        app(AppState {
            store: self.store.clone(),
            images: self.images.clone(),
            settings: self.settings.clone(),
        })
    }

    pub fn seed_user(&self, username: &str, password: &str) -> Uuid {
        let user = User::new(
            username.to_string(),
            format!("{}@example.com", username),
            utils::hash_password(password).unwrap(),
            username.to_string(),
        );
        let id = user.id;
        self.store.put(user);
        id
    }

    pub fn token_for(&self, id: Uuid) -> String {
        jwt::create_token(id, JWT_SECRET).unwrap()
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
