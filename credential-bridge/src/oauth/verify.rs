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

//! ID token signature and claim verification.

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use crate::config::ProviderConfig;
use crate::error::AppError;

use super::claims::IdTokenClaims;
use super::jwks::JwksCache;

/// Verify an ID token's signature and standard claims, returning the decoded claims.
///
/// Validates: header `alg` == RS256, signature (via the JWKS key named by
/// `kid`), `exp`, `nbf` when present, `aud` == client ID, `iss` == issuer URL.
/// Every failure is `invalid_token`, except an unreachable JWKS endpoint.
pub async fn verify_id_token(
    http: &reqwest::Client,
    jwks: &JwksCache,
    id_token: &str,
    provider: &ProviderConfig,
) -> Result<IdTokenClaims, AppError> {
    let header = decode_header(id_token)
        .map_err(|e| AppError::invalid_token(&format!("Invalid JWT header: {e}")))?;

    // Checked before the key lookup so a forged alg never reaches the network.
    if header.alg != Algorithm::RS256 {
        return Err(AppError::invalid_token(&format!(
            "unsupported JWT algorithm {:?}",
            header.alg
        )));
    }

    let kid = header
        .kid
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::invalid_token("JWT header missing kid"))?;

    let key = jwks.get_key(http, kid).await?;

    let token_data = decode::<IdTokenClaims>(id_token, &key, &validation_for(provider))
        .map_err(|e| AppError::invalid_token(&format!("JWT validation failed: {e}")))?;

    let claims = token_data.claims;
    tracing::info!(
        "Token verified for subject: {}",
        claims.subject().unwrap_or("<missing>")
    );
    Ok(claims)
}

fn validation_for(provider: &ProviderConfig) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[provider.client_id.as_str()]);
    validation.set_issuer(&[provider.issuer_url.as_str()]);
    validation.set_required_spec_claims(&["exp", "aud", "iss"]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation
}
