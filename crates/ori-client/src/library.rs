//! Local library state with optimistic favorite toggling.
//!
//! A toggle is a three-step transition: snapshot the whole list, apply the
//! change speculatively, then either commit the server's record or swap the
//! snapshot back in. Rollback never patches single fields.

use std::future::Future;

use ori_core::models::MediaItem;
use ori_core::stats::LibraryStats;
use tracing::warn;
use uuid::Uuid;

use crate::api::{ApiClient, ClientError};

/// The list as it was before a speculative change.
#[derive(Debug)]
#[must_use = "a pending toggle must be committed or rolled back"]
pub struct PendingToggle {
    id: Uuid,
    snapshot: Vec<MediaItem>,
}

impl PendingToggle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Library {
    items: Vec<MediaItem>,
}

impl Library {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn get(&self, id: Uuid) -> Option<&MediaItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Replaces the list after a full refetch.
    pub fn replace_all(&mut self, items: Vec<MediaItem>) {
        self.items = items;
    }

    pub fn stats(&self, year: i32) -> LibraryStats {
        LibraryStats::compute(&self.items, year)
    }

    /// Snapshots the list and sets `favorite` locally.
    /// `None` when the item is not in the list.
    pub fn begin_favorite(&mut self, id: Uuid, favorite: bool) -> Option<PendingToggle> {
        let snapshot = self.items.clone();
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.favorite = favorite;
        Some(PendingToggle { id, snapshot })
    }

    /// Adopts the server's version of the toggled item.
    pub fn commit(&mut self, pending: PendingToggle, confirmed: MediaItem) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == pending.id) {
            *item = confirmed;
        }
    }

    /// Restores the entire pre-toggle list.
    pub fn rollback(&mut self, pending: PendingToggle) {
        self.items = pending.snapshot;
    }

    /// Runs the whole optimistic transition around `send`.
    ///
    /// Unknown ids are left alone and `send` is not called.
    pub async fn toggle_favorite_with<F, Fut, E>(&mut self, id: Uuid, favorite: bool, send: F) -> Result<(), E>
    where
        F: FnOnce(Uuid, bool) -> Fut,
        Fut: Future<Output = Result<MediaItem, E>>,
    {
        let Some(pending) = self.begin_favorite(id, favorite) else {
            return Ok(());
        };

        match send(id, favorite).await {
            Ok(confirmed) => {
                self.commit(pending, confirmed);
                Ok(())
            }
            Err(err) => {
                warn!(%id, "failed to update favorite, reverting");
                self.rollback(pending);
                Err(err)
            }
        }
    }

    pub async fn toggle_favorite(&mut self, client: &ApiClient, id: Uuid, favorite: bool) -> Result<(), ClientError> {
        self.toggle_favorite_with(id, favorite, |id, favorite| client.set_favorite(id, favorite))
            .await
    }
}
