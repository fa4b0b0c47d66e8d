//! # Domain Models
//!
//! These structs represent the core entities of Oriana.
//! A media item is a common envelope plus a category payload whose
//! discriminant is the item's `mediaType`. On the wire the payload is
//! flattened, so clients see one flat JSON document.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::error::AppError;

/// The closed set of media categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Show,
    Anime,
    Book,
    Game,
    MusicAlbum,
}

impl MediaType {
    pub const ALL: [MediaType; 6] = [
        MediaType::Movie,
        MediaType::Show,
        MediaType::Anime,
        MediaType::Book,
        MediaType::Game,
        MediaType::MusicAlbum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
            MediaType::Anime => "anime",
            MediaType::Book => "book",
            MediaType::Game => "game",
            MediaType::MusicAlbum => "music_album",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::InvalidMediaType(s.to_string()))
    }
}

/// Where the user is with an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionStatus {
    Completed,
    InProgress,
    Planned,
    OnHold,
    Dropped,
}

impl ConsumptionStatus {
    pub const ALL: [ConsumptionStatus; 5] = [
        ConsumptionStatus::Completed,
        ConsumptionStatus::InProgress,
        ConsumptionStatus::Planned,
        ConsumptionStatus::OnHold,
        ConsumptionStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumptionStatus::Completed => "completed",
            ConsumptionStatus::InProgress => "in_progress",
            ConsumptionStatus::Planned => "planned",
            ConsumptionStatus::OnHold => "on_hold",
            ConsumptionStatus::Dropped => "dropped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ConsumptionStatus::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

/// Writes whole numbers without a fractional part, so a `4` sent by a
/// client reads back as `4` rather than `4.0`.
fn whole_as_integer<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53

    match *value {
        Some(n) if n.fract() == 0.0 && n.abs() < EXACT => serializer.serialize_some(&(n as i64)),
        Some(n) => serializer.serialize_some(&n),
        None => serializer.serialize_none(),
    }
}

/// Movie payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
}

/// Show and anime payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "whole_as_integer")]
    pub hours_played: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default)]
    pub music_genre: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_label: Option<String>,
}

/// Category-specific payload. The tag is the item's `mediaType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mediaType", rename_all = "snake_case")]
pub enum MediaDetails {
    Movie(ScreenDetails),
    Show(SeriesDetails),
    Anime(SeriesDetails),
    Book(BookDetails),
    Game(GameDetails),
    MusicAlbum(AlbumDetails),
}

impl MediaDetails {
    /// An empty payload for the given category.
    pub fn empty(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Movie => MediaDetails::Movie(ScreenDetails::default()),
            MediaType::Show => MediaDetails::Show(SeriesDetails::default()),
            MediaType::Anime => MediaDetails::Anime(SeriesDetails::default()),
            MediaType::Book => MediaDetails::Book(BookDetails::default()),
            MediaType::Game => MediaDetails::Game(GameDetails::default()),
            MediaType::MusicAlbum => MediaDetails::MusicAlbum(AlbumDetails::default()),
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            MediaDetails::Movie(_) => MediaType::Movie,
            MediaDetails::Show(_) => MediaType::Show,
            MediaDetails::Anime(_) => MediaType::Anime,
            MediaDetails::Book(_) => MediaType::Book,
            MediaDetails::Game(_) => MediaType::Game,
            MediaDetails::MusicAlbum(_) => MediaType::MusicAlbum,
        }
    }
}

/// A single logged consumption record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: Uuid,
    /// Identity-provider uid of the creator. Set once, never updated.
    pub owner: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    /// 0 to 5 inclusive
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "whole_as_integer")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_consumed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConsumptionStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// External catalog cross-references (e.g. "tmdb" -> "603")
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub external_ids: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: MediaDetails,
}

impl MediaItem {
    pub fn media_type(&self) -> MediaType {
        self.details.media_type()
    }

    /// When the item was first logged; a read-only view of `created_at`.
    pub fn date_logged(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// The verified caller, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            name: None,
        }
    }
}

/// Profile row kept in sync with the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn from_identity(identity: &Identity, now: DateTime<Utc>) -> Self {
        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: identity.name.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}
