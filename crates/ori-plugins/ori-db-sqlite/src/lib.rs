//! # ori-db-sqlite Implementation
//!
//! This module implements the data mapping between SQLite and the `ori-core`
//! domain models. Each media item is stored as a JSON document next to the
//! scalar columns the list filters need.

use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ori_core::models::{MediaItem, UserProfile};
use ori_core::query::MediaFilter;
use ori_core::traits::{MediaRepo, UserRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::info;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS media_items (
    id            TEXT PRIMARY KEY,
    owner         TEXT NOT NULL,
    media_type    TEXT NOT NULL,
    favorite      INTEGER NOT NULL DEFAULT 0,
    status        TEXT,
    date_consumed TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    document      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_media_owner_type     ON media_items (owner, media_type);
CREATE INDEX IF NOT EXISTS idx_media_owner_favorite ON media_items (owner, favorite);
CREATE INDEX IF NOT EXISTS idx_media_owner_consumed ON media_items (owner, date_consumed DESC);

CREATE TABLE IF NOT EXISTS users (
    uid          TEXT PRIMARY KEY,
    email        TEXT,
    display_name TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);
"#;

/// SQLite-backed store for media items and user profiles.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects (creating the file if needed) and applies the schema.
    ///
    /// `sqlite::memory:` databases live on a single pinned connection;
    /// every pooled connection would otherwise see its own empty database.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid sqlite url {url}"))?
            .create_if_missing(true);

        let in_memory = url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        info!(in_memory, "sqlite store ready");

        Ok(Self { pool })
    }
}

fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn decode_item(row: &SqliteRow) -> anyhow::Result<MediaItem> {
    let document: String = row.try_get("document")?;
    serde_json::from_str(&document).context("corrupt media item document")
}

fn decode_user(row: &SqliteRow) -> anyhow::Result<UserProfile> {
    let parse = |column: &str| -> anyhow::Result<DateTime<Utc>> {
        let raw: String = row.try_get(column)?;
        Ok(DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc))
    };
    Ok(UserProfile {
        uid: row.try_get("uid")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        created_at: parse("created_at")?,
        updated_at: parse("updated_at")?,
    })
}

#[async_trait]
impl MediaRepo for SqliteStore {
    async fn insert(&self, item: &MediaItem) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO media_items (id, owner, media_type, favorite, status, date_consumed, created_at, updated_at, document) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item.id.to_string())
        .bind(&item.owner)
        .bind(item.media_type().as_str())
        .bind(item.favorite)
        .bind(item.status.map(|s| s.as_str()))
        .bind(item.date_consumed.map(timestamp))
        .bind(timestamp(item.created_at))
        .bind(timestamp(item.updated_at))
        .bind(serde_json::to_string(item)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<MediaItem>> {
        sqlx::query("SELECT document FROM media_items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(decode_item)
            .transpose()
    }

    async fn list_by_owner(&self, owner: &str, filter: &MediaFilter) -> anyhow::Result<Vec<MediaItem>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT document FROM media_items WHERE owner = ");
        query.push_bind(owner);
        if let Some(media_type) = filter.media_type {
            query.push(" AND media_type = ").push_bind(media_type.as_str());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(favorite) = filter.favorite {
            query.push(" AND favorite = ").push_bind(favorite);
        }

        query
            .build()
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(decode_item)
            .collect()
    }

    async fn update(&self, item: &MediaItem) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE media_items SET favorite = ?, status = ?, date_consumed = ?, updated_at = ?, document = ? \
             WHERE id = ? AND owner = ?",
        )
        .bind(item.favorite)
        .bind(item.status.map(|s| s.as_str()))
        .bind(item.date_consumed.map(timestamp))
        .bind(timestamp(item.updated_at))
        .bind(serde_json::to_string(item)?)
        .bind(item.id.to_string())
        .bind(&item.owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid, owner: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM media_items WHERE id = ? AND owner = ?")
            .bind(id.to_string())
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn find(&self, uid: &str) -> anyhow::Result<Option<UserProfile>> {
        sqlx::query("SELECT uid, email, display_name, created_at, updated_at FROM users WHERE uid = ?")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(decode_user)
            .transpose()
    }

    async fn insert_if_absent(&self, profile: &UserProfile) -> anyhow::Result<UserProfile> {
        sqlx::query(
            "INSERT INTO users (uid, email, display_name, created_at, updated_at) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(uid) DO NOTHING",
        )
        .bind(&profile.uid)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(timestamp(profile.created_at))
        .bind(timestamp(profile.updated_at))
        .execute(&self.pool)
        .await?;

        self.find(&profile.uid)
            .await?
            .with_context(|| format!("user {} vanished after insert", profile.uid))
    }
}
