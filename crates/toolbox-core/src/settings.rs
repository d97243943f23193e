//! Subreddit config page
//!
//! The config page lives next to the usernotes page and defines, among much
//! else, the note types whose keys notes refer to. It has a single schema
//! version and is stored as plain JSON. Only the note type list is modelled
//! here; every other section is carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::json::to_string_indented;
use crate::schema::{check_version, SchemaError};

/// Latest (and earliest) config schema version this crate understands
pub const SETTINGS_SCHEMA_VERSION: i64 = 1;

/// Errors that can occur while reading or writing the config page
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Malformed subreddit config: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Unsupported subreddit config schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to serialize subreddit config: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Display information for a category of note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteType {
    /// Key referenced by notes
    pub key: String,
    /// Any CSS color string
    pub color: String,
    /// Display text
    pub text: String,
}

impl NoteType {
    pub fn new(key: &str, color: &str, text: &str) -> Self {
        Self {
            key: key.to_string(),
            color: color.to_string(),
            text: text.to_string(),
        }
    }
}

/// Note types used when a subreddit hasn't configured its own
pub fn default_note_types() -> Vec<NoteType> {
    vec![
        NoteType::new("gooduser", "green", "Good Contributor"),
        NoteType::new("spamwatch", "fuchsia", "Spam Watch"),
        NoteType::new("spamwarn", "purple", "Spam Warning"),
        NoteType::new("abusewarn", "orange", "Abuse Warning"),
        NoteType::new("ban", "red", "Ban"),
        NoteType::new("permban", "darkred", "Permanent Ban"),
        NoteType::new("botban", "black", "Bot Ban"),
    ]
}

/// Contents of a subreddit's config page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubredditConfig {
    ver: i64,
    #[serde(
        rename = "usernoteColors",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    usernote_colors: Option<Vec<NoteType>>,
    /// Sections this crate doesn't model
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Default for SubredditConfig {
    fn default() -> Self {
        Self {
            ver: SETTINGS_SCHEMA_VERSION,
            usernote_colors: None,
            other: Map::new(),
        }
    }
}

impl SubredditConfig {
    /// Parse the contents of a config page
    ///
    /// Empty contents produce an empty config at the current version.
    pub fn from_json(contents: &str) -> Result<Self, SettingsError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_str(contents).map_err(SettingsError::Malformed)?;
        let Value::Object(document) = value else {
            return Err(SchemaError::NotAnObject.into());
        };
        check_version(&document, SETTINGS_SCHEMA_VERSION, SETTINGS_SCHEMA_VERSION)?;

        serde_json::from_value(Value::Object(document)).map_err(SettingsError::Malformed)
    }

    pub fn version(&self) -> i64 {
        self.ver
    }

    /// All note types configured for the subreddit
    ///
    /// If none are configured, the defaults are written into the config
    /// first so that they are saved explicitly on the next write.
    pub fn note_types(&mut self) -> &[NoteType] {
        let colors = self.usernote_colors.get_or_insert_with(Vec::new);
        if colors.is_empty() {
            *colors = default_note_types();
        }
        colors
    }

    /// Look up the note type for a note's type key
    ///
    /// Notes can carry keys that no longer exist in the config; those
    /// return `None`.
    pub fn note_type(&mut self, key: &str) -> Option<&NoteType> {
        self.note_types().iter().find(|note_type| note_type.key == key)
    }

    /// Serialize as config page contents (minified unless `indent` is set)
    pub fn to_json_string(&self, indent: Option<usize>) -> Result<String, SettingsError> {
        to_string_indented(self, indent).map_err(SettingsError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_input() {
        let config = SubredditConfig::from_json("").unwrap();
        assert_eq!(config, SubredditConfig::default());
        assert_eq!(config.version(), SETTINGS_SCHEMA_VERSION);

        // Only the version is written for an empty config
        let value: Value = serde_json::from_str(&config.to_json_string(None).unwrap()).unwrap();
        assert_eq!(value, json!({"ver": 1}));
    }

    #[test]
    fn test_unsupported_versions() {
        for ver in [0, 2] {
            let contents = json!({"ver": ver}).to_string();
            let err = SubredditConfig::from_json(&contents).unwrap_err();
            assert!(matches!(err, SettingsError::Schema(_)), "ver {}", ver);
        }
    }

    #[test]
    fn test_malformed_input() {
        let err = SubredditConfig::from_json("[").unwrap_err();
        assert!(matches!(err, SettingsError::Malformed(_)));

        let err = SubredditConfig::from_json("[1]").unwrap_err();
        assert!(matches!(err, SettingsError::Schema(SchemaError::NotAnObject)));
    }

    #[test]
    fn test_default_note_types_written_back() {
        let mut config = SubredditConfig::from_json(r#"{"ver":1,"usernoteColors":[]}"#).unwrap();
        assert_eq!(config.note_types().len(), 7);
        assert_eq!(config.note_type("ban").map(|t| t.text.as_str()), Some("Ban"));

        let value: Value = serde_json::from_str(&config.to_json_string(None).unwrap()).unwrap();
        assert_eq!(value["usernoteColors"].as_array().unwrap().len(), 7);
        assert_eq!(value["usernoteColors"][0]["key"], json!("gooduser"));
    }

    #[test]
    fn test_configured_note_types() {
        let contents = json!({
            "ver": 1,
            "usernoteColors": [{"key": "custom", "color": "#abcdef", "text": "Custom"}],
        })
        .to_string();

        let mut config = SubredditConfig::from_json(&contents).unwrap();
        assert_eq!(config.note_types().len(), 1);
        assert_eq!(
            config.note_type("custom"),
            Some(&NoteType::new("custom", "#abcdef", "Custom"))
        );
        assert!(config.note_type("ban").is_none());
    }

    #[test]
    fn test_unmodelled_sections_preserved() {
        let contents = json!({
            "ver": 1,
            "domainTags": [{"name": "example.com", "color": "red"}],
            "banMacros": {"banNote": "note", "banMessage": "message"},
        });

        let config = SubredditConfig::from_json(&contents.to_string()).unwrap();
        let value: Value = serde_json::from_str(&config.to_json_string(None).unwrap()).unwrap();
        assert_eq!(value, contents);
    }
}
