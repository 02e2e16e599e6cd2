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

//! Custom credential minting.
//!
//! The bridge signs custom credentials with a service account key; the backend
//! identity system validates the signature and signs the user in as `uid`.

use async_trait::async_trait;
use chrono::Utc;
use credential_bridge_types::CustomTokenClaims;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{Map, Value};

use crate::config::SignerConfig;
use crate::error::AppError;
use crate::oauth::IdTokenClaims;

/// Issues signed, short-lived credentials for the backend identity system.
#[async_trait]
pub trait CredentialSigner: Send + Sync {
    /// Sign a credential for `uid`, embedding `claims` when given.
    async fn sign(&self, uid: &str, claims: Option<&Map<String, Value>>) -> anyhow::Result<String>;
}

/// Signs Firebase-style custom tokens (RS256) locally with a service account key.
pub struct ServiceAccountSigner {
    client_email: String,
    key: EncodingKey,
    key_id: Option<String>,
    ttl_secs: i64,
}

impl ServiceAccountSigner {
    pub fn new(config: &SignerConfig) -> Result<Self, String> {
        let key = EncodingKey::from_rsa_pem(config.private_key_pem.as_bytes())
            .map_err(|e| format!("invalid signer private key: {e}"))?;
        Ok(Self {
            client_email: config.client_email.clone(),
            key,
            key_id: config.key_id.clone(),
            ttl_secs: config.ttl_secs.clamp(1, CustomTokenClaims::MAX_TTL_SECS),
        })
    }
}

#[async_trait]
impl CredentialSigner for ServiceAccountSigner {
    async fn sign(&self, uid: &str, claims: Option<&Map<String, Value>>) -> anyhow::Result<String> {
        if uid.is_empty() || uid.chars().count() > CustomTokenClaims::MAX_UID_LEN {
            anyhow::bail!(
                "uid must be a non-empty string of at most {} characters",
                CustomTokenClaims::MAX_UID_LEN
            );
        }
        if let Some(reserved) = claims
            .into_iter()
            .flat_map(Map::keys)
            .find(|name| CustomTokenClaims::is_reserved_claim(name))
        {
            anyhow::bail!("developer claim {reserved:?} is reserved");
        }

        let now = Utc::now().timestamp();
        let payload = CustomTokenClaims {
            iss: self.client_email.clone(),
            sub: self.client_email.clone(),
            aud: CustomTokenClaims::AUDIENCE.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
            uid: uid.to_string(),
            claims: claims.filter(|c| !c.is_empty()).cloned(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();
        Ok(encode(&header, &payload, &self.key)?)
    }
}

/// The claim bag embedded in the credential: only the configured custom claim,
/// and only when the ID token carries it.
pub fn developer_claims(
    claims: &IdTokenClaims,
    custom_claim_name: Option<&str>,
) -> Option<Map<String, Value>> {
    let name = custom_claim_name?;
    let value = claims.get(name)?;
    let mut bag = Map::new();
    bag.insert(name.to_string(), value.clone());
    Some(bag)
}

/// Mint the custom credential for `uid`. Any signer failure is `internal_error`.
pub async fn mint_credential(
    signer: &dyn CredentialSigner,
    uid: &str,
    claims: &IdTokenClaims,
    custom_claim_name: Option<&str>,
) -> Result<String, AppError> {
    let bag = developer_claims(claims, custom_claim_name);
    let token = signer
        .sign(uid, bag.as_ref())
        .await
        .map_err(|e| AppError::internal(&format!("failed to sign custom token: {e:#}")))?;

    tracing::info!("Custom token created for UID: {uid}");
    Ok(token)
}
