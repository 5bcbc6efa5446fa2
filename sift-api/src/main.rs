use std::sync::Arc;

use anyhow::Context;
use sift_tasks::TaskDispatcher;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;
pub mod state;

use auth::SessionCookie;
use config::ApiConfig;
use repository::{PgProfileRepository, PgSessionRepository};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sift_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sift API...");

    let config = ApiConfig::from_env().context("Invalid server configuration")?;

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let dispatcher = TaskDispatcher::connect(config.tasks.clone())
        .context("Failed to set up task dispatcher")?;

    tracing::info!(
        broker = %config.tasks.broker_url,
        poll_interval_ms = config.tasks.poll_interval.as_millis() as u64,
        deadline_ms = config.tasks.deadline.as_millis() as u64,
        "Task dispatcher ready"
    );

    let cookies = match &config.cookie_secret {
        Some(secret) => SessionCookie::new(secret.as_bytes().to_vec()),
        None => {
            tracing::warn!("SIFT_COOKIE_SECRET not set, sessions will not survive a restart");
            SessionCookie::ephemeral()
        }
    };

    let state = AppState {
        profiles: Arc::new(PgProfileRepository::new(pool.clone())),
        sessions: Arc::new(PgSessionRepository::new(pool)),
        dispatcher,
        cookies,
        feedback_task: config.feedback_task.clone(),
    };

    let app = api::create_router(state, config.max_upload_bytes);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
