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

//! Application error type that implements Axum's `IntoResponse`.
//!
//! Every error is returned as an [`ErrorResponse`] paired with the HTTP status
//! of its [`ErrorKind`]. Diagnostic detail that must not reach the caller is
//! logged where the error is constructed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use credential_bridge_types::{ErrorKind, ErrorResponse};

/// Upstream bodies longer than this are truncated before being echoed back.
const MAX_UPSTREAM_BODY_CHARS: usize = 512;

/// Application-level error: an [`ErrorKind`] plus the message sent to the caller.
#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn configuration(missing: &[&str]) -> Self {
        tracing::error!("Missing required configuration: {}", missing.join(", "));
        Self::new(
            ErrorKind::ConfigurationError,
            "Service not properly configured. Check environment variables.",
        )
    }

    pub fn invalid_request(message: &str) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    pub fn token_error(message: &str) -> Self {
        Self::new(ErrorKind::TokenError, message)
    }

    /// The provider answered the token request with a non-success status.
    pub fn token_exchange_rejected(status: u16, body: &str) -> Self {
        tracing::error!("Token exchange failed. Status: {status}, Body: {body}");
        let body = body.trim();
        let detail = if body.is_empty() {
            format!("provider returned HTTP {status}")
        } else {
            format!(
                "provider returned HTTP {status}: {}",
                truncate(body, MAX_UPSTREAM_BODY_CHARS)
            )
        };
        Self::new(
            ErrorKind::TokenExchangeFailed,
            format!("Failed to exchange authorization code: {detail}"),
        )
    }

    /// The token request never produced an HTTP response (DNS, TLS, timeout...).
    pub fn token_exchange_unreachable(detail: &str) -> Self {
        tracing::error!("Token exchange request failed: {detail}");
        Self::new(
            ErrorKind::TokenExchangeFailed,
            format!("Failed to exchange authorization code: {detail}"),
        )
    }

    /// Any ID token verification failure. The detail is logged, never returned,
    /// so callers cannot tell which check failed.
    pub fn invalid_token(detail: &str) -> Self {
        tracing::error!("ID token verification failed: {detail}");
        Self::new(ErrorKind::InvalidToken, "ID token verification failed")
    }

    pub fn internal(detail: &str) -> Self {
        tracing::error!("Internal error: {detail}");
        Self::new(ErrorKind::InternalError, "An unexpected error occurred")
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse::new(self.kind, self.message))).into_response()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
