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

//! Verified ID token claims and the subject → user identifier mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator between the provider prefix and the local id in a subject,
/// e.g. `"kenni.is|12345"`.
const SUBJECT_PREFIX_SEPARATOR: char = '|';

/// The full payload of a verified OIDC ID token.
///
/// Kept as a JSON object rather than a fixed struct because the configured
/// custom claim may have any name and any JSON type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdTokenClaims(Map<String, Value>);

impl IdTokenClaims {
    /// The `sub` claim, when it is a non-empty string.
    pub fn subject(&self) -> Option<&str> {
        self.0
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// A claim by name. JSON `null` is treated as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }
}

/// Derive the stable user identifier from a subject.
///
/// `"<prefix>|<local-id>"` maps to `<local-id>` (the text after the last `|`);
/// a subject without `|` is returned unchanged. The prefix convention comes
/// from the identity provider in use; a subject that contains `|` for any other
/// reason is mapped the same way.
pub fn derive_uid(subject: &str) -> &str {
    subject
        .rsplit(SUBJECT_PREFIX_SEPARATOR)
        .next()
        .unwrap_or(subject)
}
