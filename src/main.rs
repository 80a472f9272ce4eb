// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use radium_clubs_server::{
    api::router,
    auth::JwksManager,
    bootstrap,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    state::{AppState, AuthConfig},
    storage::ClubDatabase,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    init_tracing(config.log_format);

    let db_path = config.database_path();
    let db = ClubDatabase::open(&db_path)?;
    tracing::info!(path = %db_path.display(), "Database opened");

    if let Some(name) = &config.seed.default_club {
        bootstrap::setup_default_club(
            &db,
            name,
            &config.seed.default_club_email,
            config.seed.admin_user_id.as_deref(),
        )?;
    }
    if config.seed.choices {
        bootstrap::populate_default_choices(&db, false)?;
    }

    let jwks = config.auth.jwks_url.as_deref().map(JwksManager::new).transpose()?;
    if jwks.is_none() && config.auth.jwt_secret.is_none() {
        tracing::warn!("Neither AUTH_JWKS_URL nor AUTH_JWT_SECRET is set; tokens will be rejected");
    }
    let state = AppState::new(db).with_auth_config(AuthConfig {
        jwks,
        jwt_secret: config.auth.jwt_secret.clone(),
        issuer: config.auth.issuer.clone(),
        audience: config.auth.audience.clone(),
    });

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Radium Clubs server listening (docs at /docs)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
