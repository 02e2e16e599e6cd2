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

//! OAuth2/OIDC helpers: PKCE token exchange, JWKS caching, ID token
//! verification, and claims handling.

pub mod claims;
pub mod exchange;
pub mod jwks;
pub mod verify;

// Re-export public API so callers can use `crate::oauth::*`.
pub use claims::{derive_uid, IdTokenClaims};
pub use exchange::{exchange_code, OAuthTokenResponse};
pub use jwks::JwksCache;
pub use verify::verify_id_token;
