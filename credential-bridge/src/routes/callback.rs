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

//! OAuth callback route handlers.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use credential_bridge_types::CallbackResponse;

use crate::error::AppError;
use crate::pipeline;
use crate::state::AppState;

/// POST /
///
/// Body: `{ "code": "...", "codeVerifier": "...", "redirectUri": "..." }`.
/// Exchanges the code with the provider, verifies the ID token, syncs the user
/// record, and returns `{ "customToken": "...", "uid": "..." }`.
///
/// The body is taken as raw bytes so malformed JSON is reported as
/// `invalid_request` in the usual error shape.
pub async fn handle_callback(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CallbackResponse>, AppError> {
    pipeline::run(&state, &body).await.map(Json)
}

/// GET /healthz
pub async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
