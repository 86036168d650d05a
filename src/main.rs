use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod error;
mod extract;
mod images;
mod notifications;
mod response;
mod store;
mod users;

#[cfg(test)]
mod test_support;

use config::settings::Settings;
use images::{cloudinary::Cloudinary, DynImageHost};
use store::{postgres::PgStore, DynStore};

/// Image payloads arrive inline as data URIs.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    store: DynStore,
    images: DynImageHost,
    settings: Settings,
}

impl FromRef<AppState> for DynStore {
    fn from_ref(app_state: &AppState) -> DynStore {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for DynImageHost {
    fn from_ref(app_state: &AppState) -> DynImageHost {
        app_state.images.clone()
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(app_state: &AppState) -> Settings {
        app_state.settings.clone()
    }
}

pub fn app(app_state: AppState) -> Router {
    let auth_router = Router::new()
        .route("/signup", post(auth::handler::signup))
        .route("/login", post(auth::handler::login))
        .route("/logout", post(auth::handler::logout))
        .route("/me", get(auth::handler::get_me));

    let user_router = Router::new()
        .route("/profile/:username", get(users::handler::get_user_profile))
        .route("/suggested", get(users::handler::get_suggested_users))
        .route("/follow/:id", post(users::handler::follow_unfollow_user))
        .route("/update", post(users::handler::update_user));

    Router::new()
        .route("/", get(|| async { "Hello, World!" }))
        .nest("/api/auth", auth_router)
        .nest("/api/users", user_router)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flock_backend=debug,tower_http=info")),
        )
        .init();

    let settings = Settings::new()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;

    info!("database connected");

    sqlx::migrate!().run(&pool).await?;

    info!("migrations applied");

    let app_state = AppState {
        store: Arc::new(PgStore::new(pool)),
        images: Arc::new(Cloudinary::new(settings.cloudinary.clone())),
        settings: settings.clone(),
    };

    info!("Server running on http://localhost:{}", settings.port);

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app(app_state)).await?;

    Ok(())
}
