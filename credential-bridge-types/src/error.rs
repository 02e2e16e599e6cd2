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

//! API error types.
//!
//! Every failed request is answered with an [`ErrorResponse`]:
//!
//! ```json
//! { "error": "invalid_request", "message": "Missing code or codeVerifier" }
//! ```

use serde::{Deserialize, Serialize};

/// Machine-readable error classification carried in the `error` field.
///
/// Each kind maps to exactly one HTTP status, see [`ErrorKind::status_code`].
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The deployment is missing required provider settings. Never the caller's fault.
    ConfigurationError,
    /// The request body is malformed or lacks `code` / `codeVerifier`.
    InvalidRequest,
    /// The provider answered the token exchange but the payload has no `id_token`.
    TokenError,
    /// The provider rejected the token exchange or could not be reached.
    TokenExchangeFailed,
    /// The identity token failed signature or claim validation.
    InvalidToken,
    /// Anything else, including store and signing failures.
    InternalError,
}

impl ErrorKind {
    /// HTTP status code returned alongside this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidRequest => 400,
            ErrorKind::InvalidToken => 401,
            ErrorKind::ConfigurationError
            | ErrorKind::TokenError
            | ErrorKind::TokenExchangeFailed
            | ErrorKind::InternalError => 500,
        }
    }

    /// The wire name, e.g. `"token_exchange_failed"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ConfigurationError => "configuration_error",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::TokenError => "token_error",
            ErrorKind::TokenExchangeFailed => "token_exchange_failed",
            ErrorKind::InvalidToken => "invalid_token",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of every non-200 response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    /// Human-readable description suitable for display.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}
