//! Library summary shown next to the item list.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::models::{MediaItem, MediaType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total: usize,
    /// Items whose `dateConsumed` falls in the given calendar year (UTC).
    pub this_year: usize,
    pub favorites: usize,
    /// Every media type is present, zero when absent from the library.
    pub by_type: BTreeMap<MediaType, usize>,
}

impl LibraryStats {
    pub fn compute(items: &[MediaItem], year: i32) -> Self {
        let mut by_type: BTreeMap<MediaType, usize> = MediaType::ALL.into_iter().map(|t| (t, 0)).collect();
        for item in items {
            *by_type.entry(item.media_type()).or_default() += 1;
        }

        Self {
            total: items.len(),
            this_year: items
                .iter()
                .filter(|i| i.date_consumed.is_some_and(|d| d.year() == year))
                .count(),
            favorites: items.iter().filter(|i| i.favorite).count(),
            by_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameDetails, MediaDetails};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn game(consumed_year: Option<i32>, favorite: bool) -> MediaItem {
        let now = Utc::now();
        MediaItem {
            id: Uuid::now_v7(),
            owner: "U1".into(),
            title: "Hades".into(),
            cover: None,
            rating: None,
            favorite,
            notes: None,
            date_consumed: consumed_year.map(|y| Utc.with_ymd_and_hms(y, 12, 31, 23, 59, 59).unwrap()),
            status: None,
            tags: vec![],
            external_ids: Default::default(),
            release_date: None,
            created_at: now,
            updated_at: now,
            details: MediaDetails::Game(GameDetails::default()),
        }
    }

    #[test]
    fn counts_by_year_favorite_and_type() {
        let items = [game(Some(2024), true), game(Some(2023), false), game(None, true)];
        let stats = LibraryStats::compute(&items, 2024);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.this_year, 1);
        assert_eq!(stats.favorites, 2);
        assert_eq!(stats.by_type[&MediaType::Game], 3);
        assert_eq!(stats.by_type.len(), MediaType::ALL.len());
    }

    #[test]
    fn empty_library_lists_every_type() {
        let stats = LibraryStats::compute(&[], 2024);
        assert_eq!(stats.total, 0);
        assert!(stats.by_type.values().all(|&n| n == 0));

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["byType"]["music_album"], 0);
        assert_eq!(json["thisYear"], 0);
    }
}
