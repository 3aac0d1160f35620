//! Concurrent feature retrieval
//!
//! One request per track, at most `max_concurrent` outstanding at once, no
//! ordering dependency between them. Results come back in input order.
//!
//! Per-track failures are logged and absorbed: the track's response becomes
//! [`RawFeatureResponse::Unavailable`] and the batch carries on. The only
//! batch-level failure is cancellation.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tastevec_common::Track;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::FeatureProvider;
use crate::pipeline::RawFeatureResponse;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Feature fetch cancelled")]
    Cancelled,
}

/// Fetches raw features for a batch of tracks
pub struct FeatureFetcher {
    provider: Arc<dyn FeatureProvider>,
    max_concurrent: usize,
}

impl FeatureFetcher {
    pub fn new(provider: Arc<dyn FeatureProvider>, max_concurrent: usize) -> Self {
        Self {
            provider,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetch every track's features
    ///
    /// Returns `FetchError::Cancelled` if `cancel` fires first; in-flight
    /// requests are dropped at that point.
    pub async fn fetch_all(
        &self,
        tracks: Vec<Track>,
        cancel: &CancellationToken,
    ) -> Result<Vec<(Track, RawFeatureResponse)>, FetchError> {
        let provider_name = self.provider.name();

        let fetches = stream::iter(tracks)
            .map(|track| {
                let provider = Arc::clone(&self.provider);
                async move {
                    let response = match provider.fetch_high_level(&track.id).await {
                        Ok(response) => {
                            debug!(provider = provider_name, track_id = %track.id, "Features fetched");
                            response
                        }
                        Err(e) => {
                            warn!(
                                provider = provider_name,
                                track_id = %track.id,
                                error = %e,
                                "Feature fetch failed, treating all slots as missing"
                            );
                            RawFeatureResponse::Unavailable
                        }
                    };
                    (track, response)
                }
            })
            .buffered(self.max_concurrent)
            .collect::<Vec<_>>();

        // A token cancelled before the call always wins
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            results = fetches => Ok(results),
        }
    }
}
