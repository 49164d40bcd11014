//! # TaskFlow API Server
//!
//! Role-based task management API: users with admin, read_write or
//! read_only roles collaborate on projects and their tasks.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment
//! 2. Create the database if missing, connect, run migrations
//! 3. Seed the `admin` account when `ADMIN_PASSWORD` is set
//! 4. Serve until Ctrl+C
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskflow \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p taskflow-api
//! ```
//!
//! Set `LOG_FORMAT=json` for structured logs.

use std::sync::Arc;
use taskflow_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskflow_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{PgStore, Store},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const ADMIN_USERNAME: &str = "admin";
const ADMIN_EMAIL: &str = "admin@taskflow.local";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("TaskFlow API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    ensure_database_exists(&config.database.url).await?;
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool.clone()));
    let bind_address = config.bind_address();
    let admin_password = config.admin_password.clone();
    let state = AppState::new(store, config);

    if let Some(password) = admin_password {
        if state
            .users
            .seed_admin(ADMIN_USERNAME, ADMIN_EMAIL, &password)
            .await?
            .is_none()
        {
            tracing::debug!("Admin seed skipped");
        }
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "taskflow_api=debug,taskflow_shared=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT").map_or(false, |f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
