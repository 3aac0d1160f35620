//! # Tastevec Common Library
//!
//! Shared code for the tastevec services including:
//! - The fixed acoustic/mood feature schema
//! - Track, feature vector and preference vector types
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod features;

pub use error::{Error, Result};
pub use features::{FeatureSlot, FeatureVector, PreferenceVector, Track, FEATURE_SCHEMA};
