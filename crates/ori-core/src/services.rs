//! # Services
//!
//! Orchestration between requests and the ports: allow-listing, ownership
//! checks and store calls. Services hold no per-request state; every handle
//! is injected once at startup.
//!
//! Read-then-write sequences (update, favorite, delete) are not wrapped in a
//! transaction. Two concurrent updates of one record resolve last write
//! wins; ownership still holds because every store write is owner-scoped.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::draft::{parse_favorite, MediaDraft};
use crate::error::{AppError, Result};
use crate::models::{Identity, MediaDetails, MediaItem, UserProfile};
use crate::query::{MediaFilter, SortSpec};
use crate::stats::LibraryStats;
use crate::traits::{MediaRepo, UserRepo};

const MEDIA_ITEM: &str = "MediaItem";

/// Logs the underlying cause and hides it from the caller.
fn store_failure(action: &'static str) -> impl FnOnce(anyhow::Error) -> AppError {
    move |err| {
        error!(error = %err, "store failure while {action}");
        AppError::Internal(format!("store failure while {action}"))
    }
}

/// Owns the media item rules: allow-list, required fields, immutability of
/// `owner` and `mediaType`, and owner-scoped access.
#[derive(Clone)]
pub struct MediaService {
    repo: Arc<dyn MediaRepo>,
}

impl MediaService {
    pub fn new(repo: Arc<dyn MediaRepo>) -> Self {
        Self { repo }
    }

    /// Logs a new item for `owner`. Any client-supplied owner is ignored.
    #[instrument(skip(self, body))]
    pub async fn create(&self, owner: &str, body: &Value) -> Result<MediaItem> {
        let draft = MediaDraft::from_json(body)?;

        let mut missing = Vec::new();
        if !draft.title.is_set() {
            missing.push("title".to_string());
        }
        if draft.media_type.is_none() && draft.rejected_media_type.is_none() {
            missing.push("mediaType".to_string());
        }
        if !missing.is_empty() {
            return Err(AppError::MissingRequiredField(missing));
        }
        let Some(media_type) = draft.media_type else {
            let raw = draft.rejected_media_type.unwrap_or_default();
            return Err(AppError::InvalidMediaType(raw));
        };
        draft.check_category(media_type)?;

        let now = Utc::now();
        let mut item = MediaItem {
            id: Uuid::now_v7(),
            owner: owner.to_string(),
            title: String::new(),
            cover: None,
            rating: None,
            favorite: false,
            notes: None,
            date_consumed: None,
            status: None,
            tags: Vec::new(),
            external_ids: Default::default(),
            release_date: None,
            created_at: now,
            updated_at: now,
            details: MediaDetails::empty(media_type),
        };
        draft.apply(&mut item)?;

        self.repo
            .insert(&item)
            .await
            .map_err(store_failure("creating media item"))?;

        info!(id = %item.id, media_type = %media_type, "media item created");
        Ok(item)
    }

    /// The caller's items, filtered and ordered.
    #[instrument(skip(self))]
    pub async fn list(&self, owner: &str, filter: &MediaFilter, sort: &SortSpec) -> Result<Vec<MediaItem>> {
        let mut items = self
            .repo
            .list_by_owner(owner, filter)
            .await
            .map_err(store_failure("listing media items"))?;
        sort.sort(&mut items);
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self, owner: &str, filter: &MediaFilter) -> Result<LibraryStats> {
        let items = self
            .repo
            .list_by_owner(owner, filter)
            .await
            .map_err(store_failure("computing library stats"))?;
        Ok(LibraryStats::compute(&items, Utc::now().year()))
    }

    /// Merges allow-listed fields into the caller's item. `mediaType` is
    /// discarded.
    #[instrument(skip(self, body))]
    pub async fn update(&self, owner: &str, id: &str, body: &Value) -> Result<MediaItem> {
        let mut item = self.load_owned(owner, id).await?;

        let mut draft = MediaDraft::from_json(body)?;
        if draft.media_type.take().is_some() || draft.rejected_media_type.take().is_some() {
            debug!("attempt to change mediaType ignored");
        }
        draft.check_category(item.media_type())?;
        draft.apply(&mut item)?;
        item.updated_at = Utc::now();

        self.store_update(&item, "updating media item").await?;
        Ok(item)
    }

    /// Sets only `favorite`. Carries its own ownership check.
    #[instrument(skip(self, body))]
    pub async fn set_favorite(&self, owner: &str, id: &str, body: &Value) -> Result<MediaItem> {
        let mut item = self.load_owned(owner, id).await?;

        item.favorite = parse_favorite(body)?;
        item.updated_at = Utc::now();

        self.store_update(&item, "toggling favorite").await?;
        Ok(item)
    }

    /// Hard delete.
    #[instrument(skip(self))]
    pub async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        let item = self.load_owned(owner, id).await?;

        let removed = self
            .repo
            .delete(item.id, owner)
            .await
            .map_err(store_failure("deleting media item"))?;
        if !removed {
            return Err(AppError::NotFound(MEDIA_ITEM.into(), id.into()));
        }

        info!(id = %item.id, "media item deleted");
        Ok(())
    }

    /// Existence, then ownership. Both are settled before the body is read
    /// and before any mutation.
    async fn load_owned(&self, owner: &str, id: &str) -> Result<MediaItem> {
        let not_found = || AppError::NotFound(MEDIA_ITEM.into(), id.into());

        let uuid = Uuid::parse_str(id).map_err(|_| not_found())?;
        let item = self
            .repo
            .find_by_id(uuid)
            .await
            .map_err(store_failure("loading media item"))?
            .ok_or_else(not_found)?;

        if item.owner != owner {
            return Err(AppError::Forbidden("user not authorized to modify this item".into()));
        }
        Ok(item)
    }

    async fn store_update(&self, item: &MediaItem, action: &'static str) -> Result<()> {
        let updated = self.repo.update(item).await.map_err(store_failure(action))?;
        if updated {
            Ok(())
        } else {
            // deleted between the read and the write
            Err(AppError::NotFound(MEDIA_ITEM.into(), item.id.to_string()))
        }
    }
}

/// Create-if-absent profile sync for verified identities.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepo>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self), fields(uid = %identity.uid))]
    pub async fn sync(&self, identity: &Identity) -> Result<UserProfile> {
        let profile = UserProfile::from_identity(identity, Utc::now());
        self.repo
            .insert_if_absent(&profile)
            .await
            .map_err(store_failure("syncing user profile"))
    }

    pub async fn me(&self, uid: &str) -> Result<UserProfile> {
        self.repo
            .find(uid)
            .await
            .map_err(store_failure("loading user profile"))?
            .ok_or_else(|| AppError::NotFound("UserProfile".into(), uid.into()))
    }
}
