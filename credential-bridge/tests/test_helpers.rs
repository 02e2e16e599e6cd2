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

//! Shared test helpers for credential-bridge integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http;
use axum::response::Response;
use axum::Router;
use credential_bridge::config::{ProviderConfig, SignerConfig};
use credential_bridge::db::MemoryUserStore;
use credential_bridge::oauth::JwksCache;
use credential_bridge::routes;
use credential_bridge::state::AppState;
use credential_bridge::token::ServiceAccountSigner;
use credential_bridge_types::CustomTokenClaims;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_CLIENT_ID: &str = "test-client";
pub const TEST_CLIENT_SECRET: &str = "test-secret";
pub const TEST_REDIRECT_URI: &str = "https://app.example.com/callback";
pub const TEST_KID: &str = "provider-key-1";
pub const TEST_SIGNER_EMAIL: &str = "bridge@test-project.iam.gserviceaccount.com";
pub const TOKEN_PATH: &str = "/oidc/token";
pub const JWKS_PATH: &str = "/oidc/jwks";

#[path = "../src/test_keys.rs"]
mod test_keys;

pub use test_keys::{provider_key, rogue_key, signer_key, TestKey};

// ---------------------------------------------------------------------------
// Fake identity provider
// ---------------------------------------------------------------------------

/// A wiremock server standing in for the provider's token and JWKS endpoints.
pub struct FakeProvider {
    pub server: MockServer,
}

impl FakeProvider {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// The issuer URL; endpoints live under `{issuer}/oidc/...`.
    pub fn issuer(&self) -> String {
        self.server.uri()
    }

    /// Serve a JWKS containing the provider key under [`TEST_KID`].
    pub async fn publish_jwks(&self) {
        self.publish_jwks_with(TEST_KID, provider_key()).await;
    }

    /// Serve a JWKS containing only `key` under `kid`.
    pub async fn publish_jwks_with(&self, kid: &str, key: &TestKey) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [{
                    "kty": "RSA",
                    "use": "sig",
                    "alg": "RS256",
                    "kid": kid,
                    "n": key.n,
                    "e": key.e,
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer every token request with `body`.
    pub async fn respond_to_token_request(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer every token request with `body` only after `delay`.
    pub async fn respond_to_token_request_after(&self, delay: Duration, body: Value) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Drop every mounted response and the request history.
    pub async fn reset(&self) {
        self.server.reset().await;
    }

    /// Answer every token request with a token response carrying `id_token`.
    pub async fn issue_id_token(&self, id_token: &str) {
        self.respond_to_token_request(
            200,
            json!({
                "access_token": "provider-access-token",
                "id_token": id_token,
                "refresh_token": "provider-refresh-token",
                "token_type": "Bearer",
                "expires_in": 3600,
            }),
        )
        .await;
    }

    /// Paths of every request the provider received, in order.
    pub async fn received_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }

    /// How many times `path` was requested.
    pub async fn hits(&self, path: &str) -> usize {
        self.received_paths()
            .await
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    /// Bodies of every token request, as form-encoded text.
    pub async fn token_request_bodies(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == TOKEN_PATH)
            .map(|r| String::from_utf8_lossy(&r.body).into_owned())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ID tokens
// ---------------------------------------------------------------------------

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Claims of a valid ID token for `sub = "idp|12345"`.
pub fn id_token_claims(issuer: &str) -> Value {
    json!({
        "iss": issuer,
        "aud": TEST_CLIENT_ID,
        "sub": "idp|12345",
        "email": "ada@example.com",
        "name": "Ada Lovelace",
        "given_name": "Ada",
        "family_name": "Lovelace",
        "iat": now(),
        "exp": now() + 3600,
    })
}

/// Sign `claims` with the provider key, as the provider would.
pub fn sign_id_token(claims: &Value) -> String {
    sign_id_token_with(claims, Algorithm::RS256, TEST_KID, &provider_key().encoding)
}

pub fn sign_id_token_with(claims: &Value, alg: Algorithm, kid: &str, key: &EncodingKey) -> String {
    let mut header = Header::new(alg);
    header.kid = Some(kid.to_string());
    encode(&header, claims, key).unwrap()
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Provider settings pointing at the fake provider.
pub fn provider_config(issuer: &str) -> ProviderConfig {
    ProviderConfig {
        issuer_url: issuer.to_string(),
        client_id: TEST_CLIENT_ID.to_string(),
        client_secret: TEST_CLIENT_SECRET.to_string(),
        redirect_uri: TEST_REDIRECT_URI.to_string(),
        custom_claim_name: None,
        token_url: None,
        jwks_url: None,
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
}

impl TestApp {
    /// POST a JSON value to the callback endpoint.
    pub async fn post_callback(&self, body: Value) -> Response {
        self.post_raw(body.to_string()).await
    }

    /// POST raw bytes to the callback endpoint.
    pub async fn post_raw(&self, body: impl Into<Body>) -> Response {
        let req = http::Request::builder()
            .method("POST")
            .uri("/")
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap();
        self.router.clone().oneshot(req).await.unwrap()
    }
}

/// Knobs the integration tests vary; everything else is fixed.
#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    pub jwks_cache_ttl: Duration,
    pub http_timeout: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            jwks_cache_ttl: Duration::from_secs(300),
            http_timeout: Duration::from_secs(5),
        }
    }
}

/// Build the router backed by an in-memory user store, ready for `oneshot`.
pub fn build_app(provider: ProviderConfig) -> TestApp {
    build_app_with(provider, AppOptions::default())
}

pub fn build_app_with(provider: ProviderConfig, options: AppOptions) -> TestApp {
    let users = Arc::new(MemoryUserStore::new());
    let signer = ServiceAccountSigner::new(&SignerConfig {
        client_email: TEST_SIGNER_EMAIL.to_string(),
        private_key_pem: signer_key().private_pem.clone(),
        key_id: None,
        ttl_secs: 3600,
    })
    .expect("signer key should load");

    let state = AppState {
        jwks: JwksCache::new(provider.jwks_endpoint(), options.jwks_cache_ttl),
        provider: Arc::new(provider),
        http: reqwest::Client::builder()
            .timeout(options.http_timeout)
            .build()
            .unwrap(),
        users: users.clone(),
        signer: Arc::new(signer),
        store_timeout: Duration::from_secs(5),
    };

    TestApp {
        router: routes::router().with_state(state),
        users,
    }
}

/// Consume a response body and deserialize JSON into `T`.
pub async fn response_json<T: DeserializeOwned>(resp: Response) -> T {
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("deserialize response body")
}

/// Verify a minted credential against the signer's public key.
pub fn decode_custom_token(token: &str) -> CustomTokenClaims {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[CustomTokenClaims::AUDIENCE]);
    validation.set_issuer(&[TEST_SIGNER_EMAIL]);
    jsonwebtoken::decode::<CustomTokenClaims>(token, &signer_key().decoding, &validation)
        .expect("custom token should verify")
        .claims
}
