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

//! Custom credential (JWT) claims.
//!
//! The custom credential is an RS256 JWT signed with a service account key.
//! The client hands it to the backend identity system, which checks the
//! signature against the service account's public keys and signs the user in
//! as `uid`. The payload follows the Firebase custom token layout.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JWT payload for a custom credential.
///
/// # Example payload
///
/// ```json
/// {
///   "iss": "bridge@project.iam.gserviceaccount.com",
///   "sub": "bridge@project.iam.gserviceaccount.com",
///   "aud": "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit",
///   "iat": 1707001200,
///   "exp": 1707004800,
///   "uid": "12345",
///   "claims": { "national_id": "0101302989" }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomTokenClaims {
    /// Service account email.
    pub iss: String,

    /// Service account email (same as `iss`).
    pub sub: String,

    /// Always [`CustomTokenClaims::AUDIENCE`].
    pub aud: String,

    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix seconds), at most [`CustomTokenClaims::MAX_TTL_SECS`]
    /// after `iat`.
    pub exp: i64,

    /// The user the credential signs in.
    pub uid: String,

    /// Developer claims copied into the user's ID token by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Map<String, Value>>,
}

impl CustomTokenClaims {
    /// The audience the backend identity system expects.
    pub const AUDIENCE: &'static str =
        "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";

    /// The backend rejects custom credentials that live longer than one hour.
    pub const MAX_TTL_SECS: i64 = 3600;

    /// Longest `uid` the backend accepts.
    pub const MAX_UID_LEN: usize = 128;

    /// Claim names the backend reserves; they cannot appear in `claims`.
    pub const RESERVED_CLAIMS: &'static [&'static str] = &[
        "acr",
        "amr",
        "at_hash",
        "aud",
        "auth_time",
        "azp",
        "cnf",
        "c_hash",
        "exp",
        "firebase",
        "iat",
        "iss",
        "jti",
        "nbf",
        "nonce",
        "sub",
    ];

    /// Whether `name` is reserved and so cannot be used as a developer claim.
    pub fn is_reserved_claim(name: &str) -> bool {
        Self::RESERVED_CLAIMS.contains(&name)
    }
}
