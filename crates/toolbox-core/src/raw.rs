//! Raw usernotes wire types
//!
//! These types describe the current (latest) schema of the usernotes page.
//! Older schema versions are brought up to this shape by [`crate::schema`]
//! before they are deserialized into these types.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

use crate::schema::LATEST_SCHEMA_VERSION;

/// Raw data stored as JSON on the usernotes page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUsernotes {
    /// Schema version this data conforms to
    pub ver: i64,
    /// Lookup tables referenced by index from individual notes
    #[serde(default)]
    pub constants: RawConstants,
    /// Compressed [`RawUsers`] mapping
    pub blob: String,
}

impl RawUsernotes {
    /// Assemble a document at the latest schema version
    pub fn new(constants: RawConstants, blob: String) -> Self {
        Self {
            ver: LATEST_SCHEMA_VERSION,
            constants,
            blob,
        }
    }
}

/// Deduplicated tables referenced by notes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConstants {
    /// Moderators who have left notes
    #[serde(default)]
    pub users: Vec<Option<String>>,
    /// Keys of note types that have been used
    #[serde(default)]
    pub warnings: Vec<Option<String>>,
}

/// Decompressed blob contents: username to that user's notes
pub type RawUsers = BTreeMap<String, RawUser>;

/// All notes stored on a single user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    pub ns: Vec<RawNote>,
}

/// A single note as stored in the blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNote {
    /// Seconds since the epoch
    #[serde(deserialize_with = "epoch_seconds")]
    pub t: i64,
    /// Note text
    pub n: String,
    /// Index into `constants.users`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<usize>,
    /// Index into `constants.warnings`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<usize>,
    /// Shortened context permalink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<String>,
}

/// Accept any JSON number for a timestamp
///
/// Pages migrated from millisecond timestamps can carry fractional seconds.
fn epoch_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("timestamp is not a finite number"));
    }
    Ok(value.round() as i64)
}

/// Append-on-first-use table of distinct values
///
/// Indices are handed out in first-encountered order and never change.
#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    entries: Vec<String>,
    positions: HashMap<String, usize>,
}

impl IndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the index of a value, appending it if it hasn't been seen yet
    pub fn index_of_or_insert(&mut self, value: &str) -> usize {
        if let Some(&index) = self.positions.get(value) {
            return index;
        }
        let index = self.entries.len();
        self.entries.push(value.to_string());
        self.positions.insert(value.to_string(), index);
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the table into its wire form
    pub fn into_entries(self) -> Vec<Option<String>> {
        self.entries.into_iter().map(Some).collect()
    }
}
