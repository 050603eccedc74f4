//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{SearchResponse, TitleDetails};

/// Movie catalog API trait.
///
/// Abstracts catalog operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait,
/// which is what background fetch tasks require.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Searches titles by free text.
    ///
    /// A negative catalog answer (`"Response": "False"`) is returned as a
    /// successful call; inspect [`SearchResponse::is_success`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn search(&self, query: &str) -> Result<SearchResponse>;

    /// Fetches the detail record for a single catalog id.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn title_details(&self, imdb_id: &str) -> Result<TitleDetails>;
}
