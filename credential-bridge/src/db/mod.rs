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

//! User record storage.
//!
//! The bridge only ever writes user records, through [`UserStore::merge_upsert`].
//! [`PgUserStore`] backs production; [`MemoryUserStore`] backs tests and local runs.

pub mod memory;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub use memory::MemoryUserStore;
pub use users::PgUserStore;

/// Profile fields of a user record, keyed by claim name.
pub type UserProfile = Map<String, Value>;

/// A persisted user record.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub uid: String,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Keyed, idempotent merge-upsert of user profiles.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Merge `profile` into the record for `uid` and stamp `updated_at`.
    ///
    /// Creates the record when it does not exist. Fields present in `profile`
    /// overwrite stored ones; stored fields absent from `profile` are kept.
    async fn merge_upsert(&self, uid: &str, profile: &UserProfile) -> anyhow::Result<()>;
}
