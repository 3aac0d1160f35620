//! Feature schema and shared domain types
//!
//! The schema is the fixed, ordered set of twelve high-level acoustic/mood
//! classifiers published by AcousticBrainz. Slot order defines vector
//! dimensionality and ordering everywhere in the workspace.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Prefix carried by category names that express the absence of a quality
/// (e.g. `not_happy`). Such categories are never selected as a slot value.
pub const NEGATION_MARKER: &str = "not_";

/// One named acoustic/mood dimension in the fixed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSlot {
    /// Provider key (e.g. "mood_happy")
    pub name: &'static str,
    /// Label used for output keys only
    pub label: &'static str,
    /// Positive category names in priority order
    ///
    /// The first of these present in a provider response is the one whose
    /// score becomes the slot value.
    pub positive_categories: &'static [&'static str],
}

/// Number of slots in [`FEATURE_SCHEMA`]
pub const FEATURE_DIM: usize = 12;

/// The fixed 12-slot feature schema.
pub static FEATURE_SCHEMA: [FeatureSlot; FEATURE_DIM] = [
    FeatureSlot {
        name: "danceability",
        label: "Danceability",
        positive_categories: &["danceable"],
    },
    FeatureSlot {
        name: "gender",
        label: "Gender",
        positive_categories: &["female", "male"],
    },
    FeatureSlot {
        name: "mood_acoustic",
        label: "Acoustic",
        positive_categories: &["acoustic"],
    },
    FeatureSlot {
        name: "mood_aggressive",
        label: "Aggressive",
        positive_categories: &["aggressive"],
    },
    FeatureSlot {
        name: "mood_electronic",
        label: "Electronic",
        positive_categories: &["electronic"],
    },
    FeatureSlot {
        name: "mood_happy",
        label: "Happy",
        positive_categories: &["happy"],
    },
    FeatureSlot {
        name: "mood_party",
        label: "Party",
        positive_categories: &["party"],
    },
    FeatureSlot {
        name: "mood_relaxed",
        label: "Relaxed",
        positive_categories: &["relaxed"],
    },
    FeatureSlot {
        name: "mood_sad",
        label: "Sad",
        positive_categories: &["sad"],
    },
    FeatureSlot {
        name: "timbre",
        label: "Timbre",
        positive_categories: &["bright", "dark"],
    },
    FeatureSlot {
        name: "tonal_atonal",
        label: "Tonality",
        positive_categories: &["atonal", "tonal"],
    },
    FeatureSlot {
        name: "voice_instrumental",
        label: "Voice/Instrumental",
        positive_categories: &["instrumental", "voice"],
    },
];

/// Returns true if a category name carries the negation marker
pub fn is_negated(category: &str) -> bool {
    category.starts_with(NEGATION_MARKER)
}

/// Track identity supplied by the caller
///
/// `id` is the MusicBrainz recording MBID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub image: String,
}

/// Per-track feature values aligned to [`FEATURE_SCHEMA`]
///
/// `None` is the missing marker for a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [Option<f64>; FEATURE_DIM],
}

impl FeatureVector {
    pub fn new(values: [Option<f64>; FEATURE_DIM]) -> Self {
        Self { values }
    }

    /// Vector with every slot missing (total fetch failure)
    pub fn all_missing() -> Self {
        Self {
            values: [None; FEATURE_DIM],
        }
    }

    /// Build a complete vector from dense values
    pub fn from_dense(values: [f64; FEATURE_DIM]) -> Self {
        Self {
            values: values.map(Some),
        }
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn get(&self, slot: usize) -> Option<f64> {
        self.values.get(slot).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Dense numeric row, or `None` if any slot is missing
    pub fn to_dense(&self) -> Option<Vec<f64>> {
        self.values.iter().copied().collect()
    }
}

/// Mean feature values of the dominant cluster, keyed by slot label
///
/// Entries follow schema order. Serializes as a flat JSON object
/// `{label: number}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceVector {
    entries: Vec<(&'static str, f64)>,
}

impl PreferenceVector {
    /// Pair dense per-slot means with schema labels
    pub fn from_means(means: &[f64]) -> Self {
        debug_assert_eq!(means.len(), FEATURE_DIM);
        Self {
            entries: FEATURE_SCHEMA
                .iter()
                .zip(means.iter())
                .map(|(slot, &mean)| (slot.label, mean))
                .collect(),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Values in schema order
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PreferenceVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}
