//! Domain data model.
//!
//! Search hits, detail records and watched entries share one id space: the
//! catalog's IMDb id.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reelbox_api::omdb::{NOT_AVAILABLE, SearchHit, TitleDetails};

use crate::error::SessionError;

/// Leading integer token of a free-text runtime such as "143 min".
#[allow(clippy::expect_used)]
static RUNTIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").expect("failed to compile runtime regex"));

/// A search hit as shown in the results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultItem {
    /// Catalog id.
    pub id: String,
    /// Title.
    pub title: String,
    /// Release year.
    pub year: String,
    /// Poster URL (empty when the catalog has none).
    pub poster_url: String,
}

impl From<SearchHit> for SearchResultItem {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.imdb_id,
            title: hit.title,
            year: hit.year,
            poster_url: available(hit.poster),
        }
    }
}

/// Full record for one title, fetched when it is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    /// Catalog id.
    pub id: String,
    /// Title.
    pub title: String,
    /// Release year.
    pub year: String,
    /// Poster URL (empty when the catalog has none).
    pub poster_url: String,
    /// Release date as the catalog formats it.
    pub release_date: String,
    /// Free-text runtime (e.g. "143 min").
    pub runtime: String,
    /// Catalog rating out of 10 (0 when unrated).
    pub rating: f64,
    /// Plot summary.
    pub plot: String,
    /// Comma-separated genres.
    pub genre: String,
    /// Comma-separated leading cast.
    pub cast: String,
    /// Director(s).
    pub director: String,
}

impl DetailRecord {
    /// Parses the runtime in minutes from the free-text runtime field.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Parse`] if the field does not start with an
    /// integer.
    pub fn runtime_minutes(&self) -> Result<u32, SessionError> {
        parse_runtime_minutes(&self.runtime)
    }
}

impl From<TitleDetails> for DetailRecord {
    fn from(details: TitleDetails) -> Self {
        let rating = parse_rating(&details.imdb_rating);
        Self {
            id: details.imdb_id,
            title: details.title,
            year: details.year,
            poster_url: available(details.poster),
            release_date: available(details.released),
            runtime: details.runtime,
            rating,
            plot: available(details.plot),
            genre: available(details.genre),
            cast: available(details.actors),
            director: available(details.director),
        }
    }
}

/// A user rating from 1 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserRating(u8);

impl UserRating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Validates a star count.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidRating`] outside `1..=5`.
    pub fn new(stars: u8) -> Result<Self, SessionError> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(SessionError::InvalidRating(stars))
        }
    }

    /// Returns the star count.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for UserRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A title the user has watched and rated.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchedEntry {
    /// Catalog id.
    pub id: String,
    /// Title.
    pub title: String,
    /// Poster URL.
    pub poster_url: String,
    /// Catalog rating out of 10.
    pub catalog_rating: f64,
    /// The user's rating.
    pub user_rating: UserRating,
    /// Runtime in minutes (0 when the catalog runtime was unparseable).
    pub runtime_minutes: u32,
}

/// Aggregates over the watched list. Means of an empty list are 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WatchedSummary {
    /// Number of watched titles.
    pub count: usize,
    /// Mean catalog rating.
    pub mean_catalog_rating: f64,
    /// Mean user rating.
    pub mean_user_rating: f64,
    /// Mean runtime in minutes.
    pub mean_runtime_minutes: f64,
}

/// Parses the leading integer of a free-text runtime.
///
/// # Errors
///
/// Returns [`SessionError::Parse`] if `raw` has no leading integer
/// (e.g. "N/A" or an empty string).
pub fn parse_runtime_minutes(raw: &str) -> Result<u32, SessionError> {
    RUNTIME_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .ok_or_else(|| SessionError::Parse(String::from(raw)))
}

/// Parses a catalog rating, treating "N/A" and garbage as unrated.
fn parse_rating(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or_else(|_| {
        tracing::debug!(raw, "catalog rating unavailable, using 0");
        0.0
    })
}

/// Maps the catalog's "N/A" placeholder to an empty string.
fn available(value: String) -> String {
    if value == NOT_AVAILABLE {
        String::new()
    } else {
        value
    }
}
