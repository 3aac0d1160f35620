//! HTTP API tests with in-process provider doubles

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tastevec_common::config::PipelineConfig;
use tastevec_common::features::{FEATURE_DIM, FEATURE_SCHEMA};
use tastevec_common::Track;
use tastevec_pe::pipeline::RawFeatureResponse;
use tastevec_pe::services::{
    CatalogError, FeatureProvider, ProviderError, SearchPage, SearchQuery, TrackCatalog,
};
use tastevec_pe::{build_router, AppState};
use tower::util::ServiceExt;

/// Serves canned high-level payloads; unknown ids are "not found"
struct StaticProvider {
    payloads: HashMap<String, Value>,
}

#[async_trait]
impl FeatureProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_high_level(&self, track_id: &str) -> Result<RawFeatureResponse, ProviderError> {
        let body = self
            .payloads
            .get(track_id)
            .ok_or_else(|| ProviderError::RecordingNotFound(track_id.to_string()))?;
        Ok(RawFeatureResponse::from_high_level(body)?)
    }
}

/// Returns one fixed page, or fails every search
struct StaticCatalog {
    fail: bool,
}

#[async_trait]
impl TrackCatalog for StaticCatalog {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, CatalogError> {
        if self.fail {
            return Err(CatalogError::ApiError(500, "unavailable".to_string()));
        }
        Ok(SearchPage {
            tracks: vec![Track {
                id: "rec-1".to_string(),
                name: query.title.clone(),
                artist: query.artist.clone(),
                image: "/default-cover.jpg".to_string(),
            }],
            total: 1 + u64::from(query.offset),
        })
    }
}

fn high_level(value: f64) -> Value {
    let highlevel: serde_json::Map<String, Value> = FEATURE_SCHEMA
        .iter()
        .map(|slot| (slot.name.to_string(), json!({ "value": value })))
        .collect();
    json!({ "highlevel": highlevel })
}

fn seed_payloads() -> HashMap<String, Value> {
    let mut payloads = HashMap::new();
    for (i, value) in [0.100, 0.102, 0.104, 0.106].iter().enumerate() {
        payloads.insert(format!("near-{}", i), high_level(*value));
    }
    payloads.insert("outlier".to_string(), high_level(1.0));
    payloads
}

fn test_state(catalog_fails: bool) -> AppState {
    AppState::new(
        Arc::new(StaticProvider {
            payloads: seed_payloads(),
        }),
        Arc::new(StaticCatalog {
            fail: catalog_fails,
        }),
        PipelineConfig::default(),
        4,
    )
}

fn track_json(id: &str) -> Value {
    json!({ "id": id, "name": id, "artist": "Artist", "image": "/default-cover.jpg" })
}

async fn post_recommend(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/recommend")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get(build_router(test_state(false)), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "tastevec-pe");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_recommend_returns_preference_vector() {
    let tracks = json!([
        track_json("near-0"),
        track_json("near-1"),
        track_json("outlier"),
        track_json("near-2"),
        track_json("near-3"),
    ]);

    let (status, body) = post_recommend(build_router(test_state(false)), tracks).await;

    assert_eq!(status, StatusCode::OK);
    let preference = body["preference_vector"].as_object().unwrap();
    assert_eq!(preference.len(), FEATURE_DIM);
    let danceability = preference["Danceability"].as_f64().unwrap();
    assert!((danceability - 0.103).abs() < 1e-9);

    let diagnostics = &body["diagnostics"];
    assert_eq!(diagnostics["dominant_cluster"]["size"], 4);
    assert_eq!(diagnostics["noise_track_ids"], json!(["outlier"]));
    assert_eq!(diagnostics["k_distances"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_recommend_unknown_tracks_are_excluded() {
    let tracks = json!([
        track_json("near-0"),
        track_json("near-1"),
        track_json("near-2"),
        track_json("missing"),
    ]);

    let (status, body) = post_recommend(build_router(test_state(false)), tracks).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["diagnostics"]["excluded"],
        json!([{"track_id": "missing", "reason": "all_missing"}])
    );
    assert_eq!(body["diagnostics"]["dominant_cluster"]["size"], 3);
}

#[tokio::test]
async fn test_recommend_empty_list() {
    let (status, body) = post_recommend(build_router(test_state(false)), json!([])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_recommend_insufficient_data() {
    let tracks = json!([track_json("x"), track_json("y"), track_json("z")]);

    let (status, body) = post_recommend(build_router(test_state(false)), tracks).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_DATA");
}

#[tokio::test]
async fn test_recommend_during_shutdown() {
    let state = test_state(false);
    state.shutdown.cancel();

    let tracks = json!([track_json("near-0"), track_json("near-1"), track_json("near-2")]);
    let (status, body) = post_recommend(build_router(state), tracks).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "CANCELLED");
}

#[tokio::test]
async fn test_recommend_rejects_malformed_body() {
    let (status, body) = post_recommend(build_router(test_state(false)), json!({"tracks": 1})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_recommend_rejects_unparsable_json() {
    let response = build_router(test_state(false))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/recommend")
                .header("content-type", "application/json")
                .body(Body::from("[{\"id\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["message"].as_str().unwrap().starts_with("Invalid request"));
}

#[tokio::test]
async fn test_search_requires_artist_or_title() {
    let (status, body) = get(build_router(test_state(false)), "/search?artist=&title=%20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_search_returns_page() {
    let (status, body) = get(
        build_router(test_state(false)),
        "/search?artist=Radiohead&title=Creep&offset=10",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 11);
    assert_eq!(body["tracks"][0]["artist"], "Radiohead");
    assert_eq!(body["tracks"][0]["name"], "Creep");
}

#[tokio::test]
async fn test_search_upstream_failure() {
    let (status, body) = get(build_router(test_state(true)), "/search?title=Creep").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}
