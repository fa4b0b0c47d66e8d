//! # Field allow-list
//!
//! Turns an untrusted JSON body into a [`MediaDraft`]: only recognized
//! MediaItem fields survive, each typed and range-checked. Privileged keys
//! (`owner`, `id`, timestamps) are never read.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{AppError, FieldErrors, Result};
use crate::models::{ConsumptionStatus, MediaDetails, MediaItem, MediaType};

/// Per-field intent of a partial record.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    /// Field absent from the body.
    #[default]
    Keep,
    /// Field sent as `null` (or an empty string).
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(value) => *slot = Some(value),
        }
    }
}

impl Patch<Vec<String>> {
    /// Lists are replaced whole; clearing leaves an empty list.
    pub fn apply_to_list(self, slot: &mut Vec<String>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => slot.clear(),
            Patch::Set(values) => *slot = values,
        }
    }
}

/// Category fields and the media types they belong to.
const CATEGORY_FIELDS: &[(&str, &[MediaType])] = &[
    ("authors", &[MediaType::Book]),
    ("pageCount", &[MediaType::Book]),
    ("publisher", &[MediaType::Book]),
    ("isbn", &[MediaType::Book]),
    ("platforms", &[MediaType::Game]),
    ("developers", &[MediaType::Game]),
    ("gamePublisher", &[MediaType::Game]),
    ("hoursPlayed", &[MediaType::Game]),
    ("director", &[MediaType::Movie, MediaType::Show, MediaType::Anime]),
    ("runtimeMinutes", &[MediaType::Movie, MediaType::Show, MediaType::Anime]),
    ("seasonCount", &[MediaType::Show, MediaType::Anime]),
    ("episodeCount", &[MediaType::Show, MediaType::Anime]),
    ("artist", &[MediaType::MusicAlbum]),
    ("musicGenre", &[MediaType::MusicAlbum]),
    ("trackCount", &[MediaType::MusicAlbum]),
    ("recordLabel", &[MediaType::MusicAlbum]),
];

/// Sanitized partial MediaItem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaDraft {
    pub title: Patch<String>,
    /// Only ever holds a member of the closed set.
    pub media_type: Option<MediaType>,
    /// The raw value when `mediaType` was present but not recognised.
    pub rejected_media_type: Option<String>,
    pub cover: Patch<String>,
    pub rating: Patch<f64>,
    pub favorite: Patch<bool>,
    pub notes: Patch<String>,
    pub date_consumed: Patch<DateTime<Utc>>,
    pub status: Patch<ConsumptionStatus>,
    pub tags: Patch<Vec<String>>,
    pub external_ids: Patch<BTreeMap<String, String>>,
    pub release_date: Patch<DateTime<Utc>>,

    // Book
    pub authors: Patch<Vec<String>>,
    pub page_count: Patch<u32>,
    pub publisher: Patch<String>,
    pub isbn: Patch<String>,

    // Game
    pub platforms: Patch<Vec<String>>,
    pub developers: Patch<Vec<String>>,
    pub game_publisher: Patch<String>,
    pub hours_played: Patch<f64>,

    // Movie / Show / Anime
    pub director: Patch<String>,
    pub runtime_minutes: Patch<u32>,
    pub season_count: Patch<u32>,
    pub episode_count: Patch<u32>,

    // Music album
    pub artist: Patch<String>,
    pub music_genre: Patch<Vec<String>>,
    pub track_count: Patch<u32>,
    pub record_label: Patch<String>,
}

impl MediaDraft {
    /// Extracts the allow-listed fields from a request body.
    ///
    /// Every malformed field is reported at once in `InvalidFieldValue`.
    pub fn from_json(body: &Value) -> Result<Self> {
        let map = body
            .as_object()
            .ok_or_else(|| AppError::invalid_field("body", "must be a JSON object"))?;
        let mut r = FieldReader::new(map);

        let (media_type, rejected_media_type) = r.media_type("mediaType");
        let draft = MediaDraft {
            title: r.string("title"),
            media_type,
            rejected_media_type,
            cover: r.string("cover"),
            rating: r.number("rating", 0.0, Some(5.0)),
            favorite: r.boolean("favorite"),
            notes: r.string("notes"),
            date_consumed: r.date("dateConsumed"),
            status: r.status("status"),
            tags: r.list("tags"),
            external_ids: r.string_map("externalIds"),
            release_date: r.date("releaseDate"),
            authors: r.list("authors"),
            page_count: r.count("pageCount"),
            publisher: r.string("publisher"),
            isbn: r.string("isbn"),
            platforms: r.list("platforms"),
            developers: r.list("developers"),
            game_publisher: r.string("gamePublisher"),
            hours_played: r.number("hoursPlayed", 0.0, None),
            director: r.string("director"),
            runtime_minutes: r.count("runtimeMinutes"),
            season_count: r.count("seasonCount"),
            episode_count: r.count("episodeCount"),
            artist: r.string("artist"),
            music_genre: r.list("musicGenre"),
            track_count: r.count("trackCount"),
            record_label: r.string("recordLabel"),
        };

        r.finish()?;
        Ok(draft)
    }

    fn category_field_is_set(&self, name: &str) -> bool {
        match name {
            "authors" => self.authors.is_set(),
            "pageCount" => self.page_count.is_set(),
            "publisher" => self.publisher.is_set(),
            "isbn" => self.isbn.is_set(),
            "platforms" => self.platforms.is_set(),
            "developers" => self.developers.is_set(),
            "gamePublisher" => self.game_publisher.is_set(),
            "hoursPlayed" => self.hours_played.is_set(),
            "director" => self.director.is_set(),
            "runtimeMinutes" => self.runtime_minutes.is_set(),
            "seasonCount" => self.season_count.is_set(),
            "episodeCount" => self.episode_count.is_set(),
            "artist" => self.artist.is_set(),
            "musicGenre" => self.music_genre.is_set(),
            "trackCount" => self.track_count.is_set(),
            "recordLabel" => self.record_label.is_set(),
            _ => false,
        }
    }

    /// Rejects category fields set on an item of another category.
    pub fn check_category(&self, media_type: MediaType) -> Result<()> {
        let errors: FieldErrors = CATEGORY_FIELDS
            .iter()
            .filter(|(name, types)| !types.contains(&media_type) && self.category_field_is_set(name))
            .map(|(name, _)| (name.to_string(), format!("not applicable to {media_type}")))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFieldValue(errors))
        }
    }

    /// Merges the draft into an existing item, last write wins per field.
    ///
    /// `media_type` is not read here; callers decide whether it is honored.
    /// Call [`MediaDraft::check_category`] first.
    pub fn apply(self, item: &mut MediaItem) -> Result<()> {
        match self.title {
            Patch::Keep => {}
            Patch::Clear => return Err(AppError::MissingRequiredField(vec!["title".into()])),
            Patch::Set(title) => item.title = title,
        }
        match self.favorite {
            Patch::Keep => {}
            Patch::Clear => item.favorite = false,
            Patch::Set(favorite) => item.favorite = favorite,
        }
        match self.external_ids {
            Patch::Keep => {}
            Patch::Clear => item.external_ids.clear(),
            Patch::Set(ids) => item.external_ids = ids,
        }
        self.cover.apply_to(&mut item.cover);
        self.rating.apply_to(&mut item.rating);
        self.notes.apply_to(&mut item.notes);
        self.date_consumed.apply_to(&mut item.date_consumed);
        self.status.apply_to(&mut item.status);
        self.tags.apply_to_list(&mut item.tags);
        self.release_date.apply_to(&mut item.release_date);

        match &mut item.details {
            MediaDetails::Movie(d) => {
                self.director.apply_to(&mut d.director);
                self.runtime_minutes.apply_to(&mut d.runtime_minutes);
            }
            MediaDetails::Show(d) | MediaDetails::Anime(d) => {
                self.director.apply_to(&mut d.director);
                self.runtime_minutes.apply_to(&mut d.runtime_minutes);
                self.season_count.apply_to(&mut d.season_count);
                self.episode_count.apply_to(&mut d.episode_count);
            }
            MediaDetails::Book(d) => {
                self.authors.apply_to_list(&mut d.authors);
                self.page_count.apply_to(&mut d.page_count);
                self.publisher.apply_to(&mut d.publisher);
                self.isbn.apply_to(&mut d.isbn);
            }
            MediaDetails::Game(d) => {
                self.platforms.apply_to_list(&mut d.platforms);
                self.developers.apply_to_list(&mut d.developers);
                self.game_publisher.apply_to(&mut d.game_publisher);
                self.hours_played.apply_to(&mut d.hours_played);
            }
            MediaDetails::MusicAlbum(d) => {
                self.artist.apply_to(&mut d.artist);
                self.music_genre.apply_to_list(&mut d.music_genre);
                self.track_count.apply_to(&mut d.track_count);
                self.record_label.apply_to(&mut d.record_label);
            }
        }
        Ok(())
    }
}

/// Reads typed fields out of a JSON object, accumulating errors.
struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            errors: FieldErrors::new(),
        }
    }

    fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFieldValue(self.errors))
        }
    }

    fn reject<T>(&mut self, key: &str, reason: &str) -> Patch<T> {
        self.errors.insert(key.to_string(), reason.to_string());
        Patch::Keep
    }

    /// Runs `parse` on present, non-null values.
    fn read<T>(
        &mut self,
        key: &str,
        parse: impl FnOnce(&Value) -> std::result::Result<Patch<T>, &'static str>,
    ) -> Patch<T> {
        let map = self.map;
        match map.get(key) {
            None => Patch::Keep,
            Some(Value::Null) => Patch::Clear,
            Some(value) => match parse(value) {
                Ok(patch) => patch,
                Err(reason) => self.reject(key, reason),
            },
        }
    }

    fn string(&mut self, key: &str) -> Patch<String> {
        self.read(key, |v| {
            let s = v.as_str().ok_or("must be a string")?.trim();
            Ok(if s.is_empty() { Patch::Clear } else { Patch::Set(s.to_string()) })
        })
    }

    fn boolean(&mut self, key: &str) -> Patch<bool> {
        self.read(key, |v| v.as_bool().map(Patch::Set).ok_or("must be a boolean"))
    }

    fn number(&mut self, key: &str, min: f64, max: Option<f64>) -> Patch<f64> {
        self.read(key, |v| {
            let n = v.as_f64().ok_or("must be a number")?;
            if n < min {
                return Err("is below the allowed minimum");
            }
            if max.is_some_and(|max| n > max) {
                return Err("is above the allowed maximum");
            }
            Ok(Patch::Set(n))
        })
    }

    fn count(&mut self, key: &str) -> Patch<u32> {
        self.read(key, |v| {
            if v.as_f64().is_some_and(|n| n < 0.0) {
                return Err("must not be negative");
            }
            v.as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Patch::Set)
                .ok_or("must be a non-negative integer")
        })
    }

    fn date(&mut self, key: &str) -> Patch<DateTime<Utc>> {
        self.read(key, |v| {
            let s = v.as_str().ok_or("must be a date string")?.trim();
            if s.is_empty() {
                return Ok(Patch::Clear);
            }
            parse_date(s).map(Patch::Set).ok_or("must be an RFC 3339 date-time or YYYY-MM-DD")
        })
    }

    fn status(&mut self, key: &str) -> Patch<ConsumptionStatus> {
        self.read(key, |v| {
            v.as_str()
                .and_then(ConsumptionStatus::parse)
                .map(Patch::Set)
                .ok_or("must be one of completed, in_progress, planned, on_hold, dropped")
        })
    }

    /// Non-array input is rejected; it is never split or wrapped.
    fn list(&mut self, key: &str) -> Patch<Vec<String>> {
        self.read(key, |v| {
            let items = v.as_array().ok_or("must be an array of strings")?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let s = item.as_str().ok_or("must be an array of strings")?.trim();
                if !s.is_empty() {
                    out.push(s.to_string());
                }
            }
            Ok(Patch::Set(out))
        })
    }

    fn string_map(&mut self, key: &str) -> Patch<BTreeMap<String, String>> {
        self.read(key, |v| {
            let obj = v.as_object().ok_or("must be an object of strings")?;
            obj.iter()
                .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect::<Option<BTreeMap<_, _>>>()
                .map(Patch::Set)
                .ok_or("must be an object of strings")
        })
    }

    /// Invalid values are not field errors; the raw value is handed back
    /// so creation can fail with `InvalidMediaType` and updates can drop it.
    fn media_type(&mut self, key: &str) -> (Option<MediaType>, Option<String>) {
        let Some(value) = self.map.get(key) else {
            return (None, None);
        };
        match value.as_str().map(str::parse::<MediaType>) {
            Some(Ok(media_type)) => (Some(media_type), None),
            Some(Err(_)) if value.as_str().is_some_and(|s| s.trim().is_empty()) => (None, None),
            _ => {
                warn!(media_type = %value, "invalid mediaType received");
                let raw = value.as_str().map_or_else(|| value.to_string(), str::to_string);
                (None, Some(raw))
            }
        }
    }
}

/// Accepts RFC 3339 date-times and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reads the body of a favorite toggle. Only a JSON boolean is accepted.
pub fn parse_favorite(body: &Value) -> Result<bool> {
    body.get("favorite")
        .and_then(Value::as_bool)
        .ok_or_else(|| AppError::invalid_field("favorite", "missing or invalid value (must be boolean)"))
}
