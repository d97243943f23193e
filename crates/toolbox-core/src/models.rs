//! Usernote models
//!
//! [`Note`] is a fully-resolved note as held in memory: moderator names and
//! note type keys are looked up from the page's tables, and context links
//! are expanded to full permalinks. [`NewNote`] is what callers hand to
//! [`crate::Usernotes::add`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single usernote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// The user this note is attached to
    pub username: String,
    /// The text of the note
    pub text: String,
    /// When the note was left (second resolution on disk)
    pub timestamp: DateTime<Utc>,
    /// The moderator who left the note
    pub moderator_username: String,
    /// Key of the note type, defined in the subreddit config
    pub note_type: Option<String>,
    /// Permalink to the item the note was left in response to
    pub context_permalink: Option<String>,
}

impl Note {
    /// Copy this note, attached to a different spelling of the username
    pub fn with_username(&self, username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..self.clone()
        }
    }
}

/// A note that hasn't been added to a collection yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub username: String,
    pub text: String,
    pub moderator_username: String,
    /// Defaults to the time the note is added
    pub timestamp: Option<DateTime<Utc>>,
    pub note_type: Option<String>,
    pub context_permalink: Option<String>,
}

impl NewNote {
    /// Create a note on `username` left by `moderator_username`
    pub fn new(
        username: impl Into<String>,
        text: impl Into<String>,
        moderator_username: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            text: text.into(),
            moderator_username: moderator_username.into(),
            timestamp: None,
            note_type: None,
            context_permalink: None,
        }
    }

    /// Set the note type key
    pub fn with_note_type(mut self, note_type: impl Into<String>) -> Self {
        self.note_type = Some(note_type.into());
        self
    }

    /// Set the context permalink
    pub fn with_context_permalink(mut self, permalink: impl Into<String>) -> Self {
        self.context_permalink = Some(permalink.into());
        self
    }

    /// Set an explicit timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Resolve into a [`Note`], stamping `now` if no timestamp was set
    pub fn into_note(self, now: DateTime<Utc>) -> Note {
        Note {
            username: self.username,
            text: self.text,
            timestamp: self.timestamp.unwrap_or(now),
            moderator_username: self.moderator_username,
            note_type: self.note_type,
            context_permalink: self.context_permalink,
        }
    }
}
