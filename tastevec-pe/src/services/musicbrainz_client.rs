//! MusicBrainz recording search
//!
//! Searches recordings by artist and/or title and decorates each hit with a
//! Cover Art Archive thumbnail when one exists for its first release.
//! MusicBrainz asks clients to stay at or below one request per second, so
//! search calls go through a rate limiter. Cover checks hit a different
//! host and run concurrently.

use async_trait::async_trait;
use futures::future::join_all;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use tastevec_common::config::ProviderConfig;
use tastevec_common::Track;

use super::{CatalogError, TrackCatalog};

/// MusicBrainz policy: 1 request per second
const SEARCHES_PER_SECOND: NonZeroU32 = NonZeroU32::MIN;

/// Image used when a recording has no cover art
pub const DEFAULT_COVER: &str = "/default-cover.jpg";

/// Artist name used when a recording has no artist credit
const UNKNOWN_ARTIST: &str = "Unknown";

/// Search request as received from the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub artist: String,
    pub title: String,
    pub offset: u32,
}

impl SearchQuery {
    /// Lucene query string, `None` when both terms are blank
    pub fn lucene(&self) -> Option<String> {
        let artist = self.artist.trim();
        let title = self.title.trim();

        let mut terms = Vec::with_capacity(2);
        if !artist.is_empty() {
            terms.push(format!("artist:{}", artist));
        }
        if !title.is_empty() {
            terms.push(format!("recording:{}", title));
        }

        if terms.is_empty() {
            None
        } else {
            Some(terms.join(" AND "))
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub tracks: Vec<Track>,
    /// Total hits across all pages
    pub total: u64,
}

/// MusicBrainz recording search response
#[derive(Debug, Clone, Deserialize)]
struct MBSearchResponse {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    recordings: Vec<MBRecording>,
}

#[derive(Debug, Clone, Deserialize)]
struct MBRecording {
    id: String,
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MBArtistCredit>,
    #[serde(default)]
    releases: Vec<MBRelease>,
}

#[derive(Debug, Clone, Deserialize)]
struct MBArtistCredit {
    /// Display name (may differ from the artist's own name for collaborations)
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MBRelease {
    id: String,
}

impl MBRecording {
    fn artist_display(&self) -> String {
        if self.artist_credit.is_empty() {
            return UNKNOWN_ARTIST.to_string();
        }
        self.artist_credit
            .iter()
            .map(|credit| credit.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Direct (unkeyed) limiter shared by every search on one client
type SearchRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// MusicBrainz search client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    rate_limiter: SearchRateLimiter,
    base_url: String,
    coverart_base_url: String,
    page_size: u32,
}

impl MusicBrainzClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::direct(Quota::per_second(SEARCHES_PER_SECOND)),
            base_url: config.musicbrainz_base_url.trim_end_matches('/').to_string(),
            coverart_base_url: config.coverart_base_url.trim_end_matches('/').to_string(),
            page_size: config.search_page_size,
        })
    }

    /// Search recordings and resolve cover art
    pub async fn search_recordings(&self, query: &SearchQuery) -> Result<SearchPage, CatalogError> {
        let Some(lucene) = query.lucene() else {
            return Ok(SearchPage {
                tracks: Vec::new(),
                total: 0,
            });
        };

        self.rate_limiter.until_ready().await;

        let url = format!("{}/recording", self.base_url);
        tracing::debug!(query = %lucene, offset = query.offset, "Searching MusicBrainz");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", lucene.as_str()),
                ("fmt", "json"),
                ("limit", &self.page_size.to_string()),
                ("offset", &query.offset.to_string()),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(CatalogError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError(status.as_u16(), error_text));
        }

        let body: MBSearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let tracks = join_all(body.recordings.iter().map(|rec| self.to_track(rec))).await;

        tracing::info!(
            query = %lucene,
            returned = tracks.len(),
            total = body.count,
            "MusicBrainz search complete"
        );

        Ok(SearchPage {
            tracks,
            total: body.count,
        })
    }

    async fn to_track(&self, recording: &MBRecording) -> Track {
        let image = match recording.releases.first() {
            Some(release) => self.cover_for_release(&release.id).await,
            None => DEFAULT_COVER.to_string(),
        };

        Track {
            id: recording.id.clone(),
            name: recording.title.clone(),
            artist: recording.artist_display(),
            image,
        }
    }

    /// Front thumbnail URL if the archive has one, else the default cover
    async fn cover_for_release(&self, release_id: &str) -> String {
        let cover_url = format!("{}/release/{}/front-250", self.coverart_base_url, release_id);

        match self.http_client.get(&cover_url).send().await {
            Ok(response) if response.status().is_success() => cover_url,
            Ok(response) => {
                tracing::debug!(release_id, status = %response.status(), "No cover art");
                DEFAULT_COVER.to_string()
            }
            Err(e) => {
                tracing::debug!(release_id, error = %e, "Cover art check failed");
                DEFAULT_COVER.to_string()
            }
        }
    }
}

#[async_trait]
impl TrackCatalog for MusicBrainzClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, CatalogError> {
        self.search_recordings(query).await
    }
}
