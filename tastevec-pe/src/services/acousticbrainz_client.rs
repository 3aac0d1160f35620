//! AcousticBrainz API client
//!
//! Fetches the HIGH-LEVEL classifier output for a recording: one entry per
//! classifier (danceability, gender, moods, timbre, tonality,
//! voice/instrumental), each a probability per category.
//!
//! Note: AcousticBrainz ceased accepting new submissions in 2022, so data
//! is only available for recordings analyzed before that date.

use async_trait::async_trait;
use std::time::Duration;
use tastevec_common::config::ProviderConfig;
use uuid::Uuid;

use super::{FeatureProvider, ProviderError};
use crate::pipeline::RawFeatureResponse;

/// AcousticBrainz API client
pub struct AcousticBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AcousticBrainzClient {
    /// Create new AcousticBrainz client
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.acousticbrainz_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Lookup high-level features by recording MBID
    ///
    /// The id is validated before any request is made.
    pub async fn lookup_high_level(&self, recording_mbid: &str) -> Result<RawFeatureResponse, ProviderError> {
        let mbid = Uuid::parse_str(recording_mbid)
            .map_err(|_| ProviderError::InvalidId(recording_mbid.to_string()))?;

        let url = format!("{}/{}/high-level", self.base_url, mbid);

        tracing::debug!(mbid = %mbid, url = %url, "Querying AcousticBrainz API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::RecordingNotFound(recording_mbid.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(status.as_u16(), error_text));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let features = RawFeatureResponse::from_slice(&body)?;

        tracing::debug!(mbid = %mbid, "AcousticBrainz lookup successful");

        Ok(features)
    }
}

#[async_trait]
impl FeatureProvider for AcousticBrainzClient {
    fn name(&self) -> &'static str {
        "AcousticBrainz"
    }

    async fn fetch_high_level(&self, track_id: &str) -> Result<RawFeatureResponse, ProviderError> {
        self.lookup_high_level(track_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AcousticBrainzClient::new(&ProviderConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ProviderConfig {
            acousticbrainz_base_url: "http://localhost:9999/api/v1/".to_string(),
            ..Default::default()
        };
        let client = AcousticBrainzClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/api/v1");
    }

    #[tokio::test]
    async fn test_invalid_mbid_rejected_without_request() {
        let config = ProviderConfig {
            // Nothing listens here; an actual request would be a network error
            acousticbrainz_base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = AcousticBrainzClient::new(&config).unwrap();

        let result = client.lookup_high_level("not-a-uuid").await;
        assert!(matches!(result, Err(ProviderError::InvalidId(_))));
    }
}
