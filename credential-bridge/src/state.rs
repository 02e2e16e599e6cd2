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

//! Shared application state passed to every Axum handler via `State`.
//!
//! Everything here is either immutable after startup or a collaborator handle;
//! requests never share mutable state through it (the JWKS cache only mirrors
//! what the provider publishes).

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ProviderConfig};
use crate::db::UserStore;
use crate::oauth::JwksCache;
use crate::token::CredentialSigner;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity provider settings, validated per request.
    pub provider: Arc<ProviderConfig>,
    /// Outbound HTTP client with the configured timeout.
    pub http: reqwest::Client,
    /// Provider signing keys.
    pub jwks: Arc<JwksCache>,
    /// User record store.
    pub users: Arc<dyn UserStore>,
    /// Custom credential signer.
    pub signer: Arc<dyn CredentialSigner>,
    /// Upper bound on the user store write.
    pub store_timeout: Duration,
}

impl AppState {
    pub fn new(
        config: &Config,
        users: Arc<dyn UserStore>,
        signer: Arc<dyn CredentialSigner>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            provider: Arc::new(config.provider.clone()),
            jwks: JwksCache::new(config.provider.jwks_endpoint(), config.jwks_cache_ttl),
            http,
            users,
            signer,
            store_timeout: config.store_timeout,
        })
    }
}
