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

//! Request types for the credential bridge.
//!
//! Used by the server (for deserialization) and by clients (for serialization).

use serde::{Deserialize, Serialize};

/// Request body for `POST /`.
///
/// All fields are optional at the serde level so that a missing `code` or
/// `codeVerifier` can be reported as `invalid_request` rather than a parse error.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CallbackRequest {
    /// Authorization code returned to the frontend by the provider.
    #[serde(default)]
    pub code: Option<String>,

    /// PKCE verifier generated by the frontend for this authorization attempt.
    #[serde(default, rename = "codeVerifier")]
    pub code_verifier: Option<String>,

    /// Redirect URI used during authorization. Defaults to the configured one.
    #[serde(
        default,
        rename = "redirectUri",
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect_uri: Option<String>,
}
