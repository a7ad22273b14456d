use anyhow::Context;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gigcity::{app, config::Config, AppState};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GDG Gig City site ({})", config.app.environment);

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .context("HOST/PORT do not form a socket address")?;

    // Хранилище, сессии и шаблоны
    let state = AppState::new(config).await?;
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Server error")?;
    Ok(())
}
