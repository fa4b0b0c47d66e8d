//! # ori-db-memory
//!
//! In-process implementation of `MediaRepo` and `UserRepo`.
//! Nothing survives a restart; used by tests and throwaway instances.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ori_core::models::{MediaItem, UserProfile};
use ori_core::query::MediaFilter;
use ori_core::traits::{MediaRepo, UserRepo};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryMediaRepo {
    items: DashMap<Uuid, MediaItem>,
}

impl MemoryMediaRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaRepo for MemoryMediaRepo {
    async fn insert(&self, item: &MediaItem) -> anyhow::Result<()> {
        match self.items.entry(item.id) {
            Entry::Occupied(_) => anyhow::bail!("duplicate media item id {}", item.id),
            Entry::Vacant(slot) => {
                slot.insert(item.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<MediaItem>> {
        Ok(self.items.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_by_owner(&self, owner: &str, filter: &MediaFilter) -> anyhow::Result<Vec<MediaItem>> {
        Ok(self
            .items
            .iter()
            .filter(|entry| entry.owner == owner && filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn update(&self, item: &MediaItem) -> anyhow::Result<bool> {
        match self.items.get_mut(&item.id) {
            Some(mut stored) if stored.owner == item.owner => {
                *stored = item.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid, owner: &str) -> anyhow::Result<bool> {
        Ok(self.items.remove_if(&id, |_, item| item.owner == owner).is_some())
    }
}

#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<String, UserProfile>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find(&self, uid: &str) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.users.get(uid).map(|entry| entry.value().clone()))
    }

    async fn insert_if_absent(&self, profile: &UserProfile) -> anyhow::Result<UserProfile> {
        Ok(self
            .users
            .entry(profile.uid.clone())
            .or_insert_with(|| profile.clone())
            .value()
            .clone())
    }
}
