//! Feature normalization
//!
//! Turns one raw provider response into a fixed-schema [`FeatureVector`].
//! Pure function of its input; provider failures arrive here already encoded
//! as [`RawFeatureResponse::Unavailable`] and come out as an all-missing vector.

use std::collections::BTreeMap;
use tastevec_common::features::{is_negated, FeatureSlot, FEATURE_DIM, FEATURE_SCHEMA};
use tastevec_common::FeatureVector;

use super::raw::{RawFeatureResponse, RawSlotValue};

/// Normalize a provider response against [`FEATURE_SCHEMA`]
pub fn normalize(response: &RawFeatureResponse) -> FeatureVector {
    if response.is_unavailable() {
        return FeatureVector::all_missing();
    }

    let mut values = [None; FEATURE_DIM];
    for (value, slot) in values.iter_mut().zip(FEATURE_SCHEMA.iter()) {
        *value = response
            .slot(slot.name)
            .and_then(|raw| slot_value(slot, raw))
            .filter(|v| v.is_finite());
    }
    FeatureVector::new(values)
}

fn slot_value(slot: &FeatureSlot, raw: &RawSlotValue) -> Option<f64> {
    match raw {
        RawSlotValue::Categories(categories) => {
            select_positive_category(slot, categories).and_then(|name| categories.get(name).copied())
        }
        RawSlotValue::Scalar(value) => Some(*value),
        RawSlotValue::Absent => None,
    }
}

/// Pick the category whose score represents `slot`
///
/// The slot's declared positive categories are tried in priority order. If
/// none is present, the lexicographically smallest key without the negation
/// marker is used. Negated keys are never selected.
pub fn select_positive_category<'a>(
    slot: &FeatureSlot,
    categories: &'a BTreeMap<String, f64>,
) -> Option<&'a str> {
    if let Some((name, _)) = slot
        .positive_categories
        .iter()
        .find_map(|wanted| categories.get_key_value(*wanted))
    {
        return Some(name.as_str());
    }

    // BTreeMap iterates in key order
    categories
        .keys()
        .find(|name| !is_negated(name))
        .map(String::as_str)
}
