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

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. The four identity provider settings are
//! deliberately *not* required at boot: a deployment that lacks them still
//! starts, and every callback fails with `configuration_error` until the
//! process is restarted with the values set.

use std::env;
use std::fmt;
use std::time::Duration;

use credential_bridge_types::CustomTokenClaims;
use serde::Deserialize;

/// Configuration for the credential bridge.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server (e.g. "0.0.0.0:8080").
    pub listen_addr: String,
    /// PostgreSQL connection string for the user store.
    pub database_url: String,
    /// Identity provider settings.
    pub provider: ProviderConfig,
    /// Custom credential signing identity.
    pub signer: SignerConfig,
    /// Timeout applied to every outbound HTTP call (token exchange, JWKS).
    pub http_timeout: Duration,
    /// Timeout applied to the user store write.
    pub store_timeout: Duration,
    /// How long fetched JWKS keys are reused. Zero fetches on every request.
    pub jwks_cache_ttl: Duration,
}

/// OAuth/OIDC identity provider settings.
#[derive(Clone, Default)]
pub struct ProviderConfig {
    /// Issuer base URL, also the expected `iss` of ID tokens.
    pub issuer_url: String,
    /// Client ID, also the expected `aud` of ID tokens.
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI used when the caller does not send one.
    pub redirect_uri: String,
    /// Claim copied from the ID token into the user record and the credential.
    pub custom_claim_name: Option<String>,
    /// Override for the token endpoint (default `{issuer}/oidc/token`).
    pub token_url: Option<String>,
    /// Override for the JWKS endpoint (default `{issuer}/oidc/jwks`).
    pub jwks_url: Option<String>,
}

impl ProviderConfig {
    /// Names of the required settings that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("OAUTH_ISSUER_URL", &self.issuer_url),
            ("OAUTH_CLIENT_ID", &self.client_id),
            ("OAUTH_CLIENT_SECRET", &self.client_secret),
            ("OAUTH_REDIRECT_URI", &self.redirect_uri),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn token_endpoint(&self) -> String {
        self.token_url
            .clone()
            .unwrap_or_else(|| format!("{}/oidc/token", self.issuer_base()))
    }

    pub fn jwks_endpoint(&self) -> String {
        self.jwks_url
            .clone()
            .unwrap_or_else(|| format!("{}/oidc/jwks", self.issuer_base()))
    }

    /// The caller's redirect URI when non-empty, otherwise the configured default.
    pub fn effective_redirect_uri<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|uri| !uri.is_empty())
            .unwrap_or(&self.redirect_uri)
    }

    fn issuer_base(&self) -> &str {
        self.issuer_url.trim_end_matches('/')
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("issuer_url", &self.issuer_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field("custom_claim_name", &self.custom_claim_name)
            .field("token_url", &self.token_url)
            .field("jwks_url", &self.jwks_url)
            .finish()
    }
}

/// Service account used to sign custom credentials.
#[derive(Clone)]
pub struct SignerConfig {
    pub client_email: String,
    /// PKCS#8 or PKCS#1 PEM-encoded RSA private key.
    pub private_key_pem: String,
    /// Emitted as the `kid` header when known.
    pub key_id: Option<String>,
    /// Credential lifetime in seconds (1..=3600).
    pub ttl_secs: i64,
}

/// Subset of a Google service account key file.
#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
}

impl SignerConfig {
    /// Build from the contents of a service account JSON key file.
    pub fn from_service_account_json(json: &str, ttl_secs: i64) -> Result<Self, String> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| format!("invalid service account credentials: {e}"))?;
        Ok(Self {
            client_email: key.client_email,
            private_key_pem: key.private_key,
            key_id: key.private_key_id.filter(|s| !s.is_empty()),
            ttl_secs,
        })
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("client_email", &self.client_email)
            .field("private_key_pem", &redacted(&self.private_key_pem))
            .field("key_id", &self.key_id)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Required
    /// - `DATABASE_URL`
    /// - Signer: `GOOGLE_APPLICATION_CREDENTIALS` (service account JSON path), or
    ///   `SIGNER_CLIENT_EMAIL` + `SIGNER_PRIVATE_KEY`
    ///
    /// # Required per request (checked at request time)
    /// - `OAUTH_ISSUER_URL`, `OAUTH_CLIENT_ID`, `OAUTH_CLIENT_SECRET`, `OAUTH_REDIRECT_URI`
    ///
    /// # Optional
    /// - `CUSTOM_CLAIM_NAME`
    /// - `OAUTH_TOKEN_URL`, `OAUTH_JWKS_URL`
    /// - `LISTEN_ADDR` (default: `"0.0.0.0:8080"`)
    /// - `HTTP_TIMEOUT_SECS` (default: `"10"`)
    /// - `STORE_TIMEOUT_SECS` (default: `"10"`)
    /// - `JWKS_CACHE_TTL_SECS` (default: `"300"`)
    /// - `CUSTOM_TOKEN_TTL_SECS` (default: `"3600"`)
    /// - `SIGNER_KEY_ID`
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        let database_url =
            non_empty("DATABASE_URL").ok_or("DATABASE_URL environment variable is required")?;
        let listen_addr = non_empty("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let provider = ProviderConfig {
            issuer_url: lookup("OAUTH_ISSUER_URL").unwrap_or_default(),
            client_id: lookup("OAUTH_CLIENT_ID").unwrap_or_default(),
            client_secret: lookup("OAUTH_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: lookup("OAUTH_REDIRECT_URI").unwrap_or_default(),
            custom_claim_name: non_empty("CUSTOM_CLAIM_NAME"),
            token_url: non_empty("OAUTH_TOKEN_URL"),
            jwks_url: non_empty("OAUTH_JWKS_URL"),
        };

        if let Some(name) = provider.custom_claim_name.as_deref() {
            if CustomTokenClaims::is_reserved_claim(name) {
                return Err(format!(
                    "CUSTOM_CLAIM_NAME {name:?} is reserved and cannot be embedded in custom tokens"
                ));
            }
        }

        let http_timeout = parse_secs(&lookup, "HTTP_TIMEOUT_SECS", 10)?;
        let store_timeout = parse_secs(&lookup, "STORE_TIMEOUT_SECS", 10)?;
        let jwks_cache_ttl = parse_secs(&lookup, "JWKS_CACHE_TTL_SECS", 300)?;
        if http_timeout.is_zero() || store_timeout.is_zero() {
            return Err("HTTP_TIMEOUT_SECS and STORE_TIMEOUT_SECS must be positive".to_string());
        }

        let ttl_secs = non_empty("CUSTOM_TOKEN_TTL_SECS")
            .unwrap_or_else(|| CustomTokenClaims::MAX_TTL_SECS.to_string())
            .parse::<i64>()
            .map_err(|_| "CUSTOM_TOKEN_TTL_SECS must be a valid integer")?;
        if !(1..=CustomTokenClaims::MAX_TTL_SECS).contains(&ttl_secs) {
            return Err(format!(
                "CUSTOM_TOKEN_TTL_SECS must be between 1 and {}",
                CustomTokenClaims::MAX_TTL_SECS
            ));
        }

        let signer = match non_empty("GOOGLE_APPLICATION_CREDENTIALS") {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| format!("failed to read {path}: {e}"))?;
                SignerConfig::from_service_account_json(&json, ttl_secs)?
            }
            None => SignerConfig {
                client_email: non_empty("SIGNER_CLIENT_EMAIL").ok_or(
                    "SIGNER_CLIENT_EMAIL is required when GOOGLE_APPLICATION_CREDENTIALS is unset",
                )?,
                private_key_pem: non_empty("SIGNER_PRIVATE_KEY")
                    .ok_or(
                        "SIGNER_PRIVATE_KEY is required when GOOGLE_APPLICATION_CREDENTIALS is unset",
                    )?
                    .replace("\\n", "\n"),
                key_id: non_empty("SIGNER_KEY_ID"),
                ttl_secs,
            },
        };

        Ok(Self {
            listen_addr,
            database_url,
            provider,
            signer,
            http_timeout,
            store_timeout,
            jwks_cache_ttl,
        })
    }
}

fn parse_secs<F>(lookup: &F, name: &str, default: u64) -> Result<Duration, String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("{name} must be a valid non-negative integer")),
        None => Ok(Duration::from_secs(default)),
    }
}
