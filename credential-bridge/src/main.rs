/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Credential bridge server entry point.
//!
//! A standalone Axum service that completes OAuth PKCE code exchanges and
//! issues custom credentials for the backend identity system.

use std::sync::Arc;

use credential_bridge::config::Config;
use credential_bridge::db::PgUserStore;
use credential_bridge::routes;
use credential_bridge::state::AppState;
use credential_bridge::token::ServiceAccountSigner;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("failed to load configuration");

    if !config.provider.is_complete() {
        tracing::warn!(
            "Missing provider configuration ({}); every callback will fail with configuration_error",
            config.provider.missing_fields().join(", ")
        );
    }

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(config.store_timeout)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to PostgreSQL");

    tracing::info!("Connected to PostgreSQL");

    let users = PgUserStore::new(pool);
    users
        .ensure_schema()
        .await
        .expect("failed to create users table");

    let signer = ServiceAccountSigner::new(&config.signer).expect("failed to load signer key");

    tracing::info!(
        "Signing custom tokens as {} (ttl {}s)",
        config.signer.client_email,
        config.signer.ttl_secs
    );

    let state = AppState::new(&config, Arc::new(users), Arc::new(signer))
        .expect("failed to build HTTP client");
    let app = routes::router().with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind listener");

    tracing::info!("Credential bridge listening on {}", config.listen_addr);

    axum::serve(listener, app).await.expect("server error");
}
