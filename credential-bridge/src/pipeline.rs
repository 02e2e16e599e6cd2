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

//! The OAuth callback pipeline.
//!
//! ```text
//! ConfigCheck → ParseRequest → Exchange → Verify → Sync → Mint → Respond
//! ```
//!
//! Stages run strictly in order, each at most once. The first failing stage
//! ends the request with its classified [`AppError`]; nothing is retried and
//! completed stages are not rolled back (a user record written by `Sync`
//! stays when `Mint` fails).

use credential_bridge_types::{CallbackRequest, CallbackResponse};

use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::oauth::{exchange_code, verify_id_token};
use crate::state::AppState;
use crate::sync::sync_user;
use crate::token::mint_credential;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ConfigCheck,
    ParseRequest,
    Exchange,
    Verify,
    Sync,
    Mint,
    Respond,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ConfigCheck => "config_check",
            Stage::ParseRequest => "parse_request",
            Stage::Exchange => "exchange",
            Stage::Verify => "verify",
            Stage::Sync => "sync",
            Stage::Mint => "mint",
            Stage::Respond => "respond",
        }
    }
}

/// A validated callback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub code: String,
    pub code_verifier: String,
    pub redirect_uri: Option<String>,
}

/// Fail with `configuration_error` unless every required provider setting is set.
pub fn check_config(provider: &ProviderConfig) -> Result<(), AppError> {
    let missing = provider.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::configuration(&missing))
    }
}

/// Parse the raw request body. Anything but a JSON object with non-empty
/// `code` and `codeVerifier` strings is `invalid_request`.
pub fn parse_request(body: &[u8]) -> Result<AuthorizationRequest, AppError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        tracing::error!("Request body is empty or invalid JSON: {e}");
        AppError::invalid_request("Request body must be JSON")
    })?;
    if !value.is_object() {
        tracing::error!("Request body is not a JSON object");
        return Err(AppError::invalid_request("Request body must be JSON"));
    }

    let request: CallbackRequest = serde_json::from_value(value).map_err(|e| {
        tracing::error!("Request body has malformed fields: {e}");
        AppError::invalid_request("code, codeVerifier and redirectUri must be strings")
    })?;

    match (request.code, request.code_verifier) {
        (Some(code), Some(code_verifier)) if !code.is_empty() && !code_verifier.is_empty() => {
            Ok(AuthorizationRequest {
                code,
                code_verifier,
                redirect_uri: request.redirect_uri,
            })
        }
        _ => {
            tracing::error!("Missing required parameters");
            Err(AppError::invalid_request("Missing code or codeVerifier"))
        }
    }
}

/// Run the whole pipeline for one callback request body.
pub async fn run(state: &AppState, body: &[u8]) -> Result<CallbackResponse, AppError> {
    let provider = state.provider.as_ref();
    let custom_claim_name = provider.custom_claim_name.as_deref();

    check_config(provider).map_err(failed_at(Stage::ConfigCheck))?;

    let request = parse_request(body).map_err(failed_at(Stage::ParseRequest))?;

    tracing::info!("Processing OAuth callback");

    let redirect_uri = provider.effective_redirect_uri(request.redirect_uri.as_deref());
    let tokens = exchange_code(
        &state.http,
        provider,
        &request.code,
        &request.code_verifier,
        redirect_uri,
    )
    .await
    .map_err(failed_at(Stage::Exchange))?;
    let id_token = tokens
        .require_id_token()
        .map_err(failed_at(Stage::Exchange))?;

    let claims = verify_id_token(&state.http, &state.jwks, id_token, provider)
        .await
        .map_err(failed_at(Stage::Verify))?;

    let uid = sync_user(
        state.users.as_ref(),
        &claims,
        custom_claim_name,
        state.store_timeout,
    )
    .await
    .map_err(failed_at(Stage::Sync))?;

    let custom_token = mint_credential(state.signer.as_ref(), &uid, &claims, custom_claim_name)
        .await
        .map_err(failed_at(Stage::Mint))?;

    tracing::info!(stage = Stage::Respond.as_str(), "OAuth callback completed for {uid}");
    Ok(CallbackResponse { custom_token, uid })
}

fn failed_at(stage: Stage) -> impl Fn(AppError) -> AppError {
    move |err| {
        tracing::warn!(stage = stage.as_str(), error = %err.kind, "OAuth callback failed");
        err
    }
}
