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

//! RSA keypairs for tests. Generated once per test binary.
//!
//! Compiled into the unit tests through `lib.rs` and into the integration
//! tests through `tests/test_helpers.rs`.

use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;

pub struct TestKey {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub private_pem: String,
    /// JWK modulus, base64url.
    pub n: String,
    /// JWK exponent, base64url.
    pub e: String,
}

/// Key the fake identity provider signs ID tokens with.
pub fn provider_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

/// A key nobody published.
pub fn rogue_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

/// Service account key for signing custom credentials.
pub fn signer_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

fn generate() -> TestKey {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
    let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
    let public_key = private_key.to_public_key();
    let public_pem = public_key.to_public_key_pem(LineEnding::LF).unwrap();

    TestKey {
        encoding: EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap(),
        decoding: DecodingKey::from_rsa_pem(public_pem.as_bytes()).unwrap(),
        n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        private_pem,
    }
}
