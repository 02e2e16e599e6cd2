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

//! OAuth PKCE credential bridge library.
//!
//! This crate provides the Axum router, application state, configuration, and
//! the callback pipeline: exchange the authorization code with the identity
//! provider, verify the returned ID token, sync the user record, and mint a
//! custom credential for the backend identity system. The binary entry point
//! (`main.rs`) is a thin wrapper that calls into this library.

pub mod config;
pub mod db;
pub mod error;
pub mod oauth;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod sync;
pub mod token;

#[cfg(test)]
pub(crate) mod test_keys;
