pub mod config;
pub mod database;
pub mod redis_client;
pub mod models;
pub mod controllers;
pub mod middleware;
pub mod services;
pub mod store;
pub mod error;
pub mod utils;
pub mod validation;

use anyhow::Context;
use axum::{routing::get, Router};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    config::Config,
    database::Database,
    models::User,
    redis_client::RedisClient,
    services::{
        auth::{AuthGate, MemorySessions, SessionStore},
        render::PageRenderer,
    },
    store::RecordStore,
};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: RecordStore,
    pub auth: AuthGate,
    pub pages: PageRenderer,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store = match &config.database.url {
            Some(url) => {
                let db = Database::new(url, config.database.pool_size)
                    .await
                    .context("Failed to connect to database")?;
                info!("Database connected");
                db.run_migrations().await.context("Failed to run migrations")?;
                RecordStore::Postgres(db)
            }
            None => {
                warn!("DATABASE_URL is not set, records are kept in memory");
                RecordStore::memory()
            }
        };

        let sessions = match &config.redis.url {
            Some(url) => {
                let redis = RedisClient::new(url).await.context("Failed to connect to Redis")?;
                info!("Redis connected");
                SessionStore::Redis(redis)
            }
            None => {
                warn!("REDIS_URL is not set, sessions are kept in memory");
                let sessions = MemorySessions::default();
                // Локальная разработка без провайдера входа
                if let (Some(token), Some(email)) =
                    (&config.auth.dev_session_token, &config.auth.dev_session_email)
                {
                    sessions.insert(token.clone(), User { email: email.clone(), nickname: None })?;
                    info!("Seeded development session for {}", email);
                }
                SessionStore::Memory(sessions)
            }
        };

        let pages = match &config.site.template_dir {
            Some(dir) => PageRenderer::with_overrides(Path::new(dir))
                .with_context(|| format!("Failed to load templates from {}", dir))?,
            None => PageRenderer::builtin(),
        };

        Ok(Arc::new(Self::from_parts(config, store, sessions, pages)))
    }

    pub fn from_parts(
        config: Config,
        store: RecordStore,
        sessions: SessionStore,
        pages: PageRenderer,
    ) -> Self {
        let auth = AuthGate::new(&config.auth, sessions);
        Self { config, store, auth, pages }
    }
}

/// Роутер собирается один раз при старте и передаётся в `axum::serve`.
pub fn app(state: Arc<AppState>) -> Router {
    let static_dir = PathBuf::from(&state.config.site.static_dir);

    controllers::routes(&state.config.features)
        .route("/health", get(|| async { "OK" }))
        // Готовый CSS и картинки
        .nest_service("/css", ServeDir::new(static_dir.join("css")))
        .nest_service("/static/img", ServeDir::new(static_dir.join("img")))
        .fallback(controllers::pages::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::errors::render_error_pages,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
