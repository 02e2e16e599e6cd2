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

//! In-process user store with the same merge semantics as [`super::PgUserStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{StoredUser, UserProfile, UserStore};

/// User store backed by a `HashMap`. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, StoredUser>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, uid: &str) -> Option<StoredUser> {
        self.users.lock().await.get(uid).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn merge_upsert(&self, uid: &str, profile: &UserProfile) -> anyhow::Result<()> {
        let now = Utc::now();
        let mut users = self.users.lock().await;
        let record = users.entry(uid.to_string()).or_insert_with(|| StoredUser {
            uid: uid.to_string(),
            profile: UserProfile::new(),
            created_at: now,
            updated_at: now,
        });
        for (field, value) in profile {
            record.profile.insert(field.clone(), value.clone());
        }
        record.updated_at = now;
        Ok(())
    }
}
