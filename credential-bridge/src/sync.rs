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

//! User record synchronization after a verified sign-in.

use std::time::Duration;

use crate::db::{UserProfile, UserStore};
use crate::error::AppError;
use crate::oauth::{derive_uid, IdTokenClaims};

/// ID token claims copied into the user record.
pub const PROFILE_CLAIMS: [&str; 5] = ["sub", "email", "name", "given_name", "family_name"];

/// Build the profile written for a sign-in: the whitelisted claims plus the
/// custom claim, minus anything absent or `null`.
pub fn build_profile(claims: &IdTokenClaims, custom_claim_name: Option<&str>) -> UserProfile {
    let mut profile: UserProfile = PROFILE_CLAIMS
        .iter()
        .filter_map(|name| claims.get(name).map(|value| (name.to_string(), value.clone())))
        .collect();

    if let Some(name) = custom_claim_name {
        if let Some(value) = claims.get(name) {
            profile.insert(name.to_string(), value.clone());
        }
    }
    profile
}

/// Create or update the user record for the token's subject and return its uid.
///
/// The store write is bounded by `timeout`. A missing subject, a store error,
/// or a timeout is `internal_error`.
pub async fn sync_user(
    store: &dyn UserStore,
    claims: &IdTokenClaims,
    custom_claim_name: Option<&str>,
    timeout: Duration,
) -> Result<String, AppError> {
    let subject = claims
        .subject()
        .ok_or_else(|| AppError::internal("ID token missing 'sub' claim"))?;

    let uid = derive_uid(subject);
    if uid.is_empty() {
        return Err(AppError::internal(&format!(
            "subject {subject:?} yields an empty uid"
        )));
    }

    let profile = build_profile(claims, custom_claim_name);

    match tokio::time::timeout(timeout, store.merge_upsert(uid, &profile)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(AppError::internal(&format!("user store write failed: {e:#}"))),
        Err(_) => return Err(AppError::internal("user store write timed out")),
    }

    tracing::info!("User profile updated: {uid}");
    Ok(uid.to_string())
}
