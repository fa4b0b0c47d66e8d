//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Identity, MediaItem, UserProfile};
use crate::query::MediaFilter;

/// Document store contract for media items.
///
/// Mutating calls carry the owner so adapters can scope the write itself,
/// not only the read that precedes it.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaRepo: Send + Sync {
    async fn insert(&self, item: &MediaItem) -> anyhow::Result<()>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<MediaItem>>;
    /// All of `owner`'s items matching `filter`, in no particular order.
    async fn list_by_owner(&self, owner: &str, filter: &MediaFilter) -> anyhow::Result<Vec<MediaItem>>;
    /// Replaces the stored document with the same id and owner.
    /// Returns `false` when no such document exists.
    async fn update(&self, item: &MediaItem) -> anyhow::Result<bool>;
    /// Returns `false` when no document with this id and owner exists.
    async fn delete(&self, id: Uuid, owner: &str) -> anyhow::Result<bool>;
}

/// Profile rows mirrored from the identity provider.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find(&self, uid: &str) -> anyhow::Result<Option<UserProfile>>;
    /// Stores `profile` unless a row for its uid exists; returns the stored row.
    async fn insert_if_absent(&self, profile: &UserProfile) -> anyhow::Result<UserProfile>;
}

/// Bearer-token verification.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Unauthorized` for a rejected token, `Internal` when the provider
    /// itself fails.
    async fn verify_token(&self, token: &str) -> Result<Identity>;
}
