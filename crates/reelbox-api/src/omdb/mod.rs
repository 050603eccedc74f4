//! OMDb catalog API client module.
//!
//! Handles HTTP requests to the OMDb endpoint and retrieves
//! free-text search results and per-title detail records.

mod api;
mod client;
mod rate_limiter;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, LocalCatalogApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, OmdbClient, OmdbClientBuilder};
pub use rate_limiter::DEFAULT_MIN_INTERVAL;
pub use types::{NOT_AVAILABLE, SearchHit, SearchResponse, TitleDetails};

/// Base URL of the IMDb title pages referenced by catalog ids.
pub const IMDB_TITLE_BASE_URL: &str = "https://www.imdb.com/title";
