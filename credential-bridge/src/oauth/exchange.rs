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

//! Authorization code → token exchange (PKCE, confidential client).

use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::error::AppError;

/// Raw response from the OAuth token endpoint.
///
/// Only `id_token` is relied on; the other tokens are passed through untouched.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OAuthTokenResponse {
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl OAuthTokenResponse {
    /// The ID token, or `token_error` when the provider did not send one.
    pub fn require_id_token(&self) -> Result<&str, AppError> {
        self.id_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::error!("Token response missing id_token");
                AppError::token_error("No ID token received")
            })
    }
}

/// Exchange an authorization code and PKCE verifier for tokens.
///
/// Makes exactly one request; the timeout comes from the shared `http` client.
/// A non-2xx status or a transport failure is `token_exchange_failed`; a 2xx
/// body that is not a JSON token response is `token_error`.
pub async fn exchange_code(
    http: &reqwest::Client,
    provider: &ProviderConfig,
    authorization_code: &str,
    code_verifier: &str,
    redirect_uri: &str,
) -> Result<OAuthTokenResponse, AppError> {
    let token_url = provider.token_endpoint();

    tracing::info!("Exchanging code for tokens at {token_url}");
    tracing::info!("Using redirect_uri: {redirect_uri}");

    let params = [
        ("grant_type", "authorization_code"),
        ("code", authorization_code),
        ("code_verifier", code_verifier),
        ("client_id", provider.client_id.as_str()),
        ("client_secret", provider.client_secret.as_str()),
        ("redirect_uri", redirect_uri),
    ];

    let response = http
        .post(&token_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| AppError::token_exchange_unreachable(&describe(&e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::token_exchange_unreachable(&describe(&e)))?;

    if !status.is_success() {
        return Err(AppError::token_exchange_rejected(status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Failed to parse token response: {e}");
        AppError::token_error("Token response was not valid JSON")
    })
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "token endpoint timed out".to_string()
    } else if err.is_connect() {
        "could not connect to token endpoint".to_string()
    } else {
        err.to_string()
    }
}
