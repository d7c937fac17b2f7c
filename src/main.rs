use anyhow::Context;

mod app;
mod auth;
mod blogs;
mod config;
mod db;
mod error;
mod extract;
mod state;
mod users;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "blog_api=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // A missing or weak JWT secret stops the process here.
    let config = AppConfig::from_env().context("load configuration")?;
    tracing::debug!(host = %config.host, port = config.port, jwt = ?config.jwt, "configuration loaded");

    let app_state = AppState::init(&config).await?;
    let app = app::build_app(app_state);
    app::serve(app, &config).await
}
