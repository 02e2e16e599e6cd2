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

//! Response types for the credential bridge.

use serde::{Deserialize, Serialize};

/// Response payload for a successful `POST /` (200 OK).
///
/// ```json
/// { "customToken": "eyJhbGciOiJSUzI1NiIs...", "uid": "12345" }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CallbackResponse {
    /// Signed custom credential for the backend identity system.
    #[serde(rename = "customToken")]
    pub custom_token: String,
    /// Stable user identifier derived from the identity token subject.
    pub uid: String,
}
