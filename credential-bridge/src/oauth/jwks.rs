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

//! JWKS (JSON Web Key Set) cache with time-bounded reuse.
//!
//! Only RSA signature keys are loaded, since ID tokens are accepted with RS256
//! alone. A `kid` that is not in the cached set always triggers a fresh fetch,
//! so provider key rotation behaves exactly as if nothing were cached.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::AppError;

/// A JWK entry from the JWKS endpoint.
#[derive(Debug, Deserialize)]
struct JwkEntry {
    #[serde(default)]
    kid: Option<String>,
    kty: String,
    #[serde(default, rename = "use")]
    key_use: Option<String>,
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<JwkEntry>,
}

#[derive(Default)]
struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

/// Caches JWKS keys fetched from the provider.
pub struct JwksCache {
    jwks_url: String,
    ttl: Duration,
    cached: RwLock<CachedKeys>,
}

impl JwksCache {
    /// A cache that reuses a fetched key set for `ttl`. A zero `ttl` fetches on
    /// every lookup.
    pub fn new(jwks_url: String, ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            jwks_url,
            ttl,
            cached: RwLock::new(CachedKeys::default()),
        })
    }

    /// Create a test-only JwksCache with pre-loaded keys that never expire.
    #[cfg(test)]
    pub fn with_keys(keys: HashMap<String, DecodingKey>) -> Arc<Self> {
        Arc::new(Self {
            jwks_url: String::new(),
            ttl: Duration::from_secs(u32::MAX as u64),
            cached: RwLock::new(CachedKeys {
                keys,
                fetched_at: Some(Instant::now()),
            }),
        })
    }

    /// Get the decoding key for a given `kid`.
    ///
    /// A missing key after a fresh fetch is `invalid_token`; failing to fetch
    /// or parse the key set is an infrastructure failure (`internal_error`).
    pub async fn get_key(&self, http: &reqwest::Client, kid: &str) -> Result<DecodingKey, AppError> {
        {
            let cached = self.cached.read().await;
            let fresh = cached
                .fetched_at
                .is_some_and(|at| at.elapsed() < self.ttl);
            if fresh {
                if let Some(key) = cached.keys.get(kid) {
                    return Ok(key.clone());
                }
            }
        }

        let keys = self.fetch(http).await?;
        let found = keys.get(kid).cloned();

        if !self.ttl.is_zero() {
            *self.cached.write().await = CachedKeys {
                keys,
                fetched_at: Some(Instant::now()),
            };
        }

        found.ok_or_else(|| AppError::invalid_token(&format!("no JWKS key matches kid {kid}")))
    }

    /// Fetch the JWKS document and decode its usable RSA keys.
    async fn fetch(&self, http: &reqwest::Client) -> Result<HashMap<String, DecodingKey>, AppError> {
        let resp = http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AppError::internal(&format!("JWKS fetch failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(AppError::internal(&format!(
                "JWKS fetch returned HTTP {status}"
            )));
        }

        let doc: JwksDocument = resp
            .json()
            .await
            .map_err(|e| AppError::internal(&format!("Failed to parse JWKS: {e}")))?;

        Ok(decode_rsa_keys(doc))
    }
}

fn decode_rsa_keys(doc: JwksDocument) -> HashMap<String, DecodingKey> {
    let mut keys = HashMap::new();
    for jwk in doc.keys {
        let Some(kid) = jwk.kid else { continue };
        if jwk.kty != "RSA" {
            continue;
        }
        if jwk.key_use.as_deref().is_some_and(|u| u != "sig") {
            continue;
        }
        if jwk.alg.as_deref().is_some_and(|a| a != "RS256") {
            continue;
        }
        let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
            continue;
        };
        match DecodingKey::from_rsa_components(n, e) {
            Ok(key) => {
                keys.insert(kid, key);
            }
            Err(err) => tracing::warn!("Skipping invalid RSA JWK {kid}: {err}"),
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_keys::{provider_key, TestKey};
    use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
    use serde_json::json;

    fn doc(json: serde_json::Value) -> JwksDocument {
        serde_json::from_value(json).unwrap()
    }

    fn jwk(kid: &str, key: &TestKey) -> serde_json::Value {
        json!({"kid": kid, "kty": "RSA", "use": "sig", "alg": "RS256", "n": key.n, "e": key.e})
    }

    #[test]
    fn published_key_verifies_tokens_signed_with_it() {
        let key = provider_key();
        let keys = decode_rsa_keys(doc(json!({ "keys": [jwk("k1", key)] })));

        let token = encode(
            &Header::new(Algorithm::RS256),
            &json!({"sub": "idp|1", "exp": 4_102_444_800u64}),
            &key.encoding,
        )
        .unwrap();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        let decoded = decode::<serde_json::Value>(&token, &keys["k1"], &validation).unwrap();
        assert_eq!(decoded.claims["sub"], "idp|1");
    }

    #[test]
    fn non_rsa_and_non_signature_keys_are_skipped() {
        let key = provider_key();
        let keys = decode_rsa_keys(doc(json!({
            "keys": [
                {"kid": "ec", "kty": "EC", "crv": "P-256", "x": "abc", "y": "def"},
                {"kid": "enc", "kty": "RSA", "use": "enc", "n": key.n, "e": key.e},
                {"kid": "rs512", "kty": "RSA", "alg": "RS512", "n": key.n, "e": key.e},
                {"kty": "RSA", "n": key.n, "e": key.e}
            ]
        })));
        assert!(keys.is_empty());
    }

    #[test]
    fn rsa_key_without_use_or_alg_is_loaded() {
        let key = provider_key();
        let keys = decode_rsa_keys(doc(json!({
            "keys": [{"kid": "k1", "kty": "RSA", "n": key.n, "e": key.e}]
        })));
        assert!(keys.contains_key("k1"));
    }

    #[test]
    fn rsa_key_missing_components_is_skipped() {
        let keys = decode_rsa_keys(doc(json!({
            "keys": [{"kid": "k1", "kty": "RSA", "n": provider_key().n}]
        })));
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn preloaded_keys_are_served_without_fetching() {
        let mut keys = HashMap::new();
        keys.insert("k1".to_string(), provider_key().decoding.clone());
        let cache = JwksCache::with_keys(keys);
        assert!(cache.get_key(&reqwest::Client::new(), "k1").await.is_ok());
    }
}
