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

//! Shared API types for the OAuth PKCE credential bridge.
//!
//! This crate defines the wire contract between the bridge and its callers
//! (browser frontends, integration tests), plus the payload of the custom
//! credential it mints. It is intentionally framework-agnostic: no axum, no
//! database types.

pub mod error;
pub mod requests;
pub mod responses;
pub mod token;

pub use error::{ErrorKind, ErrorResponse};
pub use requests::CallbackRequest;
pub use responses::CallbackResponse;
pub use token::CustomTokenClaims;
