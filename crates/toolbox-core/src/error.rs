//! Usernotes error handling
//!
//! Provides typed errors for reading and writing the usernotes page, with
//! classification helpers and recovery suggestions for callers deciding
//! whether a write-back is safe.

use thiserror::Error;

use crate::blob::BlobError;
use crate::schema::SchemaError;

/// Errors that can occur while reading or writing usernotes
#[derive(Error, Debug)]
pub enum NotesError {
    /// Page contents are not valid JSON, or don't match the current schema
    #[error("Malformed usernotes document: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Schema version is unknown, or a migration failed
    #[error("Unsupported usernotes schema: {0}")]
    Schema(#[from] SchemaError),

    /// The notes blob could not be decoded
    #[error("Failed to decode usernotes blob: {0}")]
    Decode(#[from] BlobError),

    /// A note references a moderator that isn't in the moderator table
    #[error(
        "Note #{position} on user '{username}' references moderator index {index:?}, but the moderator table has {table_len} entries"
    )]
    UnknownModerator {
        username: String,
        position: usize,
        index: Option<usize>,
        table_len: usize,
    },

    /// A note's timestamp is outside the representable range
    #[error("Note on user '{username}' has an invalid timestamp: {timestamp}")]
    InvalidTimestamp { username: String, timestamp: i64 },

    /// Notes could not be compressed back into a blob
    #[error("Failed to encode usernotes blob: {0}")]
    Encode(#[source] BlobError),

    /// Notes could not be serialized back to JSON
    #[error("Failed to serialize usernotes: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl NotesError {
    /// Check if the page uses a schema version this crate can't handle
    pub fn is_unsupported_schema(&self) -> bool {
        matches!(
            self,
            NotesError::Schema(SchemaError::TooOld { .. } | SchemaError::TooNew { .. })
        )
    }

    /// Check if the page data itself is damaged
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            NotesError::Decode(_)
                | NotesError::UnknownModerator { .. }
                | NotesError::InvalidTimestamp { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            NotesError::Schema(SchemaError::TooNew { .. }) => {
                Some("The page was written by a newer client. Upgrade before editing notes, and do not write back.")
            }
            NotesError::Schema(SchemaError::TooOld { .. }) => {
                Some("The page predates every supported schema. Open it with a client that still supports it to upgrade it first.")
            }
            NotesError::Decode(_) | NotesError::UnknownModerator { .. } => {
                Some("The page is damaged. Restore an earlier wiki revision before writing notes again.")
            }
            _ => None,
        }
    }
}
