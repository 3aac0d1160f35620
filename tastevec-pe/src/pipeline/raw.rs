//! Raw feature-provider responses
//!
//! The provider's high-level payload carries one entry per classifier under
//! `highlevel`, each either `{"all": {category: score, ...}}` or
//! `{"value": number}`.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Payload that could not be read as a high-level response at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed feature data: {0}")]
pub struct MalformedFeatureData(pub String);

/// One slot of a provider payload
#[derive(Debug, Clone, PartialEq)]
pub enum RawSlotValue {
    /// Category name to score
    Categories(BTreeMap<String, f64>),
    /// Direct scalar value
    Scalar(f64),
    /// Entry present but carries nothing usable
    Absent,
}

impl RawSlotValue {
    fn from_entry(entry: &Value) -> Self {
        if let Some(all) = entry.get("all").and_then(Value::as_object) {
            let categories = all
                .iter()
                .filter_map(|(name, score)| score.as_f64().map(|s| (name.clone(), s)))
                .collect();
            return RawSlotValue::Categories(categories);
        }

        match entry.get("value").and_then(Value::as_f64) {
            Some(value) => RawSlotValue::Scalar(value),
            None => RawSlotValue::Absent,
        }
    }
}

/// Provider response for one track
#[derive(Debug, Clone, PartialEq)]
pub enum RawFeatureResponse {
    /// Successfully parsed payload, keyed by slot name
    Payload(BTreeMap<String, RawSlotValue>),
    /// Fetch failed or payload was malformed; every slot is missing
    Unavailable,
}

impl RawFeatureResponse {
    /// Parse a high-level response body
    pub fn from_high_level(body: &Value) -> Result<Self, MalformedFeatureData> {
        let highlevel = body
            .get("highlevel")
            .ok_or_else(|| MalformedFeatureData("missing 'highlevel' section".to_string()))?
            .as_object()
            .ok_or_else(|| MalformedFeatureData("'highlevel' is not an object".to_string()))?;

        let slots = highlevel
            .iter()
            .map(|(name, entry)| (name.clone(), RawSlotValue::from_entry(entry)))
            .collect();

        Ok(RawFeatureResponse::Payload(slots))
    }

    /// Parse a high-level response from raw bytes
    pub fn from_slice(body: &[u8]) -> Result<Self, MalformedFeatureData> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| MalformedFeatureData(format!("invalid JSON: {}", e)))?;
        Self::from_high_level(&value)
    }

    pub fn slot(&self, name: &str) -> Option<&RawSlotValue> {
        match self {
            RawFeatureResponse::Payload(slots) => slots.get(name),
            RawFeatureResponse::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, RawFeatureResponse::Unavailable)
    }
}
