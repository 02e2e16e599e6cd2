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

//! PostgreSQL user storage queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use super::{StoredUser, UserProfile, UserStore};

/// User store backed by the `users` table; profiles live in a JSONB column.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    uid: String,
    profile: Json<UserProfile>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for StoredUser {
    fn from(row: UserRow) -> Self {
        Self {
            uid: row.uid,
            profile: row.profile.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                uid        TEXT PRIMARY KEY,
                profile    JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch a user record by uid.
    pub async fn fetch_user(&self, uid: &str) -> Result<Option<StoredUser>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT uid, profile, created_at, updated_at FROM users WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoredUser::from))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn merge_upsert(&self, uid: &str, profile: &UserProfile) -> anyhow::Result<()> {
        // `||` on JSONB keeps keys missing from the right-hand side.
        sqlx::query(
            r#"
            INSERT INTO users (uid, profile, created_at, updated_at)
            VALUES ($1, $2, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT (uid)
            DO UPDATE SET profile = users.profile || EXCLUDED.profile, updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(uid)
        .bind(Json(profile))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
