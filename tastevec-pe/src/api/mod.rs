//! HTTP API handlers for tastevec-pe
//!
//! - `POST /recommend`: seed tracks in, preference vector out
//! - `GET /search`: recording search for picking seed tracks
//! - `GET /health`: liveness and uptime

pub mod health;
pub mod recommend;
pub mod search;

pub use health::health_routes;
pub use recommend::recommend_routes;
pub use search::search_routes;
