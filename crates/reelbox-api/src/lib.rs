//! Movie catalog client library for reelbox.
//!
//! Provides a client for the OMDb catalog API.

/// OMDb catalog API client.
pub mod omdb;
