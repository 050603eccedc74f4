//! OMDb API response types.
//!
//! The catalog answers every request with HTTP 200 and a `Response` flag of
//! `"True"` or `"False"`; a negative answer carries a human-readable `Error`.

use serde::Deserialize;

/// Placeholder the catalog uses for missing values.
pub const NOT_AVAILABLE: &str = "N/A";

// --- Search ---

/// Response from a `?s=` search request.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// `"True"` or `"False"`.
    #[serde(rename = "Response")]
    pub response: String,
    /// Matching titles in catalog order (absent on negative answers).
    #[serde(rename = "Search")]
    pub search: Option<Vec<SearchHit>>,
    /// Total number of matches across all pages, as a decimal string.
    #[serde(rename = "totalResults")]
    pub total_results: Option<String>,
    /// Catalog error message (e.g. "Movie not found!").
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl SearchResponse {
    /// Returns `true` when the catalog reported a positive answer.
    #[must_use]
    pub fn is_success(&self) -> bool {
        is_true(&self.response)
    }
}

/// A single search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year (may be a range such as "2011–2019").
    #[serde(rename = "Year")]
    pub year: String,
    /// IMDb id (e.g. "tt0770828").
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Kind of title ("movie", "series", "episode").
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// Poster URL or "N/A".
    #[serde(rename = "Poster", default)]
    pub poster: String,
}

// --- Title details ---

/// Response from an `?i=` detail request.
///
/// Every field except `Response` is absent on negative answers, so all of
/// them default to an empty string.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleDetails {
    /// `"True"` or `"False"`.
    #[serde(rename = "Response")]
    pub response: String,
    /// Catalog error message (e.g. "Incorrect IMDb ID.").
    #[serde(rename = "Error")]
    pub error: Option<String>,
    /// IMDb id.
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    /// Title.
    #[serde(rename = "Title", default)]
    pub title: String,
    /// Release year.
    #[serde(rename = "Year", default)]
    pub year: String,
    /// Release date (e.g. "14 Jun 2013").
    #[serde(rename = "Released", default)]
    pub released: String,
    /// Free-text runtime (e.g. "143 min").
    #[serde(rename = "Runtime", default)]
    pub runtime: String,
    /// Comma-separated genres.
    #[serde(rename = "Genre", default)]
    pub genre: String,
    /// Director(s).
    #[serde(rename = "Director", default)]
    pub director: String,
    /// Comma-separated leading cast.
    #[serde(rename = "Actors", default)]
    pub actors: String,
    /// Plot summary.
    #[serde(rename = "Plot", default)]
    pub plot: String,
    /// Poster URL or "N/A".
    #[serde(rename = "Poster", default)]
    pub poster: String,
    /// IMDb rating as a decimal string or "N/A".
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,
}

impl TitleDetails {
    /// Returns `true` when the catalog reported a positive answer.
    #[must_use]
    pub fn is_success(&self) -> bool {
        is_true(&self.response)
    }
}

/// Body returned alongside non-2xx statuses (e.g. invalid API key).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    /// Always `"False"` in practice.
    #[serde(rename = "Response")]
    pub response: String,
    /// Error message.
    #[serde(rename = "Error")]
    pub error: String,
}

/// Interprets the catalog's string-encoded boolean.
fn is_true(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("true")
}
