//! Track search endpoint
//!
//! GET /search?artist=&title=&offset= proxies a MusicBrainz recording search
//! and returns `{tracks, total}`.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::services::{SearchPage, SearchQuery};
use crate::AppState;

/// GET /search query parameters
///
/// `offset` is kept as a string: anything that is not a non-negative
/// integer falls back to the first page.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
    pub offset: Option<String>,
}

impl SearchParams {
    fn into_query(self) -> SearchQuery {
        let offset = self
            .offset
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0);

        SearchQuery {
            artist: self.artist,
            title: self.title,
            offset,
        }
    }
}

/// GET /search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage>> {
    let query = params.into_query();

    if query.lucene().is_none() {
        return Err(ApiError::BadRequest(
            "artist or title must be provided".to_string(),
        ));
    }

    let page = state.catalog.search(&query).await?;
    Ok(Json(page))
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(offset: Option<&str>) -> SearchParams {
        SearchParams {
            artist: "a".to_string(),
            title: String::new(),
            offset: offset.map(str::to_string),
        }
    }

    #[test]
    fn test_offset_parsing() {
        assert_eq!(params(None).into_query().offset, 0);
        assert_eq!(params(Some("20")).into_query().offset, 20);
        assert_eq!(params(Some("abc")).into_query().offset, 0);
        assert_eq!(params(Some("-5")).into_query().offset, 0);
    }
}
