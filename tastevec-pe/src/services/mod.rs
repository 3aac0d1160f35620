//! External collaborators of the preference estimator
//!
//! - [`acousticbrainz_client`]: per-track high-level features
//! - [`musicbrainz_client`]: recording search with cover art
//! - [`feature_fetcher`]: concurrent, failure-absorbing feature retrieval
//!
//! Both providers sit behind traits so the HTTP layer and tests can swap them.

pub mod acousticbrainz_client;
pub mod feature_fetcher;
pub mod musicbrainz_client;

pub use acousticbrainz_client::AcousticBrainzClient;
pub use feature_fetcher::{FeatureFetcher, FetchError};
pub use musicbrainz_client::{MusicBrainzClient, SearchPage, SearchQuery};

use async_trait::async_trait;
use thiserror::Error;

use crate::pipeline::{MalformedFeatureData, RawFeatureResponse};

/// Feature provider errors
///
/// Always per-track; the fetcher turns every one of these into missing data.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Track id is not a MusicBrainz recording id
    #[error("Invalid recording id: {0}")]
    InvalidId(String),

    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Recording has no features in the provider database
    #[error("Recording not found: {0}")]
    RecordingNotFound(String),

    /// Provider returned a non-success status
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Payload could not be read as a high-level response
    #[error(transparent)]
    Malformed(#[from] MalformedFeatureData),
}

/// Source of per-track high-level features
#[async_trait]
pub trait FeatureProvider: Send + Sync {
    /// Provider identifier for logs
    fn name(&self) -> &'static str;

    /// Fetch the raw high-level payload for one track
    async fn fetch_high_level(&self, track_id: &str) -> Result<RawFeatureResponse, ProviderError>;
}

/// Track search errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Searchable catalog of tracks
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, CatalogError>;
}
