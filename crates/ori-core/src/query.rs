//! # List queries
//!
//! Filters are pushed down to the store; ordering is applied here so every
//! store adapter sorts the same way.

use std::cmp::Ordering;

use crate::models::{ConsumptionStatus, MediaDetails, MediaItem, MediaType};

/// Optional narrowing of an owner's library. The owner scope itself is
/// never part of the filter; stores take it as a separate argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFilter {
    pub media_type: Option<MediaType>,
    pub status: Option<ConsumptionStatus>,
    pub favorite: Option<bool>,
}

impl MediaFilter {
    /// Builds a filter from raw query parameters.
    ///
    /// Unknown media types and statuses are ignored rather than rejected.
    /// `favorite` is true only for the literal `"true"`.
    pub fn from_params(media_type: Option<&str>, status: Option<&str>, favorite: Option<&str>) -> Self {
        Self {
            media_type: media_type.and_then(|t| t.parse().ok()),
            status: status.and_then(ConsumptionStatus::parse),
            favorite: favorite.filter(|f| !f.is_empty()).map(|f| f == "true"),
        }
    }

    pub fn matches(&self, item: &MediaItem) -> bool {
        self.media_type.map_or(true, |t| item.media_type() == t)
            && self.status.map_or(true, |s| item.status == Some(s))
            && self.favorite.map_or(true, |f| item.favorite == f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    MediaType,
    Rating,
    Favorite,
    DateConsumed,
    ReleaseDate,
    Status,
    CreatedAt,
    UpdatedAt,
    Cover,
    Notes,
    // category fields; items of other categories count as missing
    PageCount,
    Publisher,
    Isbn,
    GamePublisher,
    HoursPlayed,
    Director,
    RuntimeMinutes,
    SeasonCount,
    EpisodeCount,
    Artist,
    TrackCount,
    RecordLabel,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "title" => SortField::Title,
            "mediaType" => SortField::MediaType,
            "rating" => SortField::Rating,
            "favorite" => SortField::Favorite,
            "dateConsumed" => SortField::DateConsumed,
            "releaseDate" => SortField::ReleaseDate,
            "status" => SortField::Status,
            "createdAt" | "dateLogged" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "cover" => SortField::Cover,
            "notes" => SortField::Notes,
            "pageCount" => SortField::PageCount,
            "publisher" => SortField::Publisher,
            "isbn" => SortField::Isbn,
            "gamePublisher" => SortField::GamePublisher,
            "hoursPlayed" => SortField::HoursPlayed,
            "director" => SortField::Director,
            "runtimeMinutes" => SortField::RuntimeMinutes,
            "seasonCount" => SortField::SeasonCount,
            "episodeCount" => SortField::EpisodeCount,
            "artist" => SortField::Artist,
            "trackCount" => SortField::TrackCount,
            "recordLabel" => SortField::RecordLabel,
            _ => return None,
        })
    }

    /// Ascending comparison. Missing values sort lowest.
    fn compare(&self, a: &MediaItem, b: &MediaItem) -> Ordering {
        match self {
            SortField::Title => a.title.cmp(&b.title),
            SortField::MediaType => a.media_type().as_str().cmp(b.media_type().as_str()),
            SortField::Rating => compare_numbers(a.rating, b.rating),
            SortField::Favorite => a.favorite.cmp(&b.favorite),
            SortField::DateConsumed => a.date_consumed.cmp(&b.date_consumed),
            SortField::ReleaseDate => a.release_date.cmp(&b.release_date),
            SortField::Status => a.status.map(|s| s.as_str()).cmp(&b.status.map(|s| s.as_str())),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Cover => a.cover.cmp(&b.cover),
            SortField::Notes => a.notes.cmp(&b.notes),
            SortField::HoursPlayed => compare_numbers(hours_played(a), hours_played(b)),
            SortField::PageCount
            | SortField::RuntimeMinutes
            | SortField::SeasonCount
            | SortField::EpisodeCount
            | SortField::TrackCount => self.count(a).cmp(&self.count(b)),
            SortField::Publisher
            | SortField::Isbn
            | SortField::GamePublisher
            | SortField::Director
            | SortField::Artist
            | SortField::RecordLabel => self.text(a).cmp(&self.text(b)),
        }
    }

    fn count(&self, item: &MediaItem) -> Option<u32> {
        match (&item.details, self) {
            (MediaDetails::Book(book), SortField::PageCount) => book.page_count,
            (MediaDetails::Movie(movie), SortField::RuntimeMinutes) => movie.runtime_minutes,
            (MediaDetails::Show(series) | MediaDetails::Anime(series), field) => match field {
                SortField::RuntimeMinutes => series.runtime_minutes,
                SortField::SeasonCount => series.season_count,
                SortField::EpisodeCount => series.episode_count,
                _ => None,
            },
            (MediaDetails::MusicAlbum(album), SortField::TrackCount) => album.track_count,
            _ => None,
        }
    }

    fn text<'a>(&self, item: &'a MediaItem) -> Option<&'a str> {
        match (&item.details, self) {
            (MediaDetails::Book(book), SortField::Publisher) => book.publisher.as_deref(),
            (MediaDetails::Book(book), SortField::Isbn) => book.isbn.as_deref(),
            (MediaDetails::Game(game), SortField::GamePublisher) => game.game_publisher.as_deref(),
            (MediaDetails::Movie(movie), SortField::Director) => movie.director.as_deref(),
            (MediaDetails::Show(series) | MediaDetails::Anime(series), SortField::Director) => {
                series.director.as_deref()
            }
            (MediaDetails::MusicAlbum(album), SortField::Artist) => album.artist.as_deref(),
            (MediaDetails::MusicAlbum(album), SortField::RecordLabel) => album.record_label.as_deref(),
            _ => None,
        }
    }
}

fn hours_played(item: &MediaItem) -> Option<f64> {
    match &item.details {
        MediaDetails::Game(game) => game.hours_played,
        _ => None,
    }
}

fn compare_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (x, y) => x.is_some().cmp(&y.is_some()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

/// Ordered list of sort keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

const DEFAULT_KEYS: [SortKey; 2] = [
    SortKey { field: SortField::DateConsumed, descending: true },
    SortKey { field: SortField::CreatedAt, descending: true },
];

impl Default for SortSpec {
    /// Most recently experienced first, then most recently logged.
    fn default() -> Self {
        Self { keys: DEFAULT_KEYS.to_vec() }
    }
}

impl SortSpec {
    /// Parses a `sortBy` expression such as `"-rating title"`.
    ///
    /// Caller keys come first; default keys not named by the caller follow
    /// as tie-breakers. Unknown fields are skipped.
    pub fn parse(expr: Option<&str>) -> Self {
        let mut keys: Vec<SortKey> = Vec::new();

        for token in expr.unwrap_or_default().split_whitespace() {
            let (descending, name) = match token.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, token),
            };
            let Some(field) = SortField::parse(name) else {
                continue;
            };
            if keys.iter().all(|k| k.field != field) {
                keys.push(SortKey { field, descending });
            }
        }

        for default in DEFAULT_KEYS {
            if keys.iter().all(|k| k.field != default.field) {
                keys.push(default);
            }
        }

        Self { keys }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Total order: falls back to id so equal keys stay deterministic.
    pub fn compare(&self, a: &MediaItem, b: &MediaItem) -> Ordering {
        self.keys
            .iter()
            .map(|key| {
                let ord = key.field.compare(a, b);
                if key.descending { ord.reverse() } else { ord }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    pub fn sort(&self, items: &mut [MediaItem]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}
