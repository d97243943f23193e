//! Usernotes collection
//!
//! [`Usernotes`] holds every note on every user from a subreddit's usernotes
//! page. It is built from the raw page text (upgrading old schemas on the
//! way in) and collapses back into the compact page form on the way out.
//!
//! ## Username casing
//!
//! Some third-party clients lowercase usernames before writing notes, which
//! splits a user's notes across two keys. [`Usernotes::get`] merges the
//! lowercased entry into the canonical spelling whenever it is asked for a
//! name containing capitals. That merge is a permanent change to the
//! collection and will be reflected in the next write.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::blob::{compress_blob, decompress_blob};
use crate::error::NotesError;
use crate::json::to_string_indented;
use crate::models::{NewNote, Note};
use crate::permalink::{expand_permalink, squash_permalink};
use crate::raw::{IndexTable, RawConstants, RawNote, RawUser, RawUsernotes, RawUsers};
use crate::schema;

/// All usernotes from a single usernotes page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Usernotes {
    /// Username (as stored) to notes, newest first
    users: BTreeMap<String, Vec<Note>>,
}

impl Usernotes {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the contents of a usernotes page
    ///
    /// Empty page contents produce an empty collection. Older schema
    /// versions are migrated to the latest one first.
    pub fn from_json(contents: &str) -> Result<Self, NotesError> {
        if contents.trim().is_empty() {
            return Ok(Self::new());
        }

        let value = serde_json::from_str(contents).map_err(NotesError::Malformed)?;
        let raw = schema::migrate(value)?;
        Self::from_raw(raw)
    }

    /// Build the collection from a page already at the latest schema
    pub fn from_raw(raw: RawUsernotes) -> Result<Self, NotesError> {
        let raw_users: RawUsers = decompress_blob(&raw.blob)?;

        let mut users = BTreeMap::new();
        for (username, RawUser { ns }) in raw_users {
            let mut notes = Vec::with_capacity(ns.len());
            for (position, raw_note) in ns.into_iter().enumerate() {
                notes.push(resolve_note(&username, position, raw_note, &raw.constants)?);
            }
            if !notes.is_empty() {
                users.insert(username, notes);
            }
        }

        debug!("Loaded usernotes for {} users", users.len());
        Ok(Self { users })
    }

    /// Add a note to the front of its user's list
    ///
    /// Notes without a timestamp are stamped with the current time.
    /// Identical notes are not deduplicated.
    pub fn add(&mut self, note: NewNote) {
        let note = note.into_note(Utc::now());
        self.users
            .entry(note.username.clone())
            .or_default()
            .insert(0, note);
    }

    /// Get a copy of all notes on a user, newest first
    ///
    /// This is a mutating query. If `username` contains capitals and notes
    /// exist under its all-lowercase spelling, those notes are renamed and
    /// moved under `username`, the lowercase entry is deleted, and the merged
    /// list is re-sorted by timestamp (newest first). The order of notes with
    /// identical timestamps is unspecified after such a merge.
    pub fn get(&mut self, username: &str) -> Vec<Note> {
        let lowercase = username.to_lowercase();
        if username != lowercase && self.users.contains_key(&lowercase) {
            self.merge_lowercase_variant(username, &lowercase);
        }
        self.notes_for(username).to_vec()
    }

    /// Notes stored under exactly this username, without any case merging
    pub fn notes_for(&self, username: &str) -> &[Note] {
        self.users.get(username).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Usernames that have at least one note, in storage order
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users
            .iter()
            .filter(|(_, notes)| !notes.is_empty())
            .map(|(username, _)| username.as_str())
    }

    /// Number of users with at least one note
    pub fn len(&self) -> usize {
        self.usernames().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of notes across all users
    pub fn note_count(&self) -> usize {
        self.users.values().map(Vec::len).sum()
    }

    /// Collapse the collection into the raw page form
    ///
    /// Moderator and note type tables are rebuilt from scratch in the order
    /// values are first encountered. Users without notes are omitted.
    pub fn to_raw(&self) -> Result<RawUsernotes, NotesError> {
        let mut moderators = IndexTable::new();
        let mut note_types = IndexTable::new();
        let mut raw_users = RawUsers::new();

        for (username, notes) in &self.users {
            if notes.is_empty() {
                continue;
            }

            let ns = notes
                .iter()
                .map(|note| RawNote {
                    t: epoch_seconds(note.timestamp),
                    n: note.text.clone(),
                    m: Some(moderators.index_of_or_insert(&note.moderator_username)),
                    w: note
                        .note_type
                        .as_deref()
                        .map(|key| note_types.index_of_or_insert(key)),
                    l: note.context_permalink.as_deref().map(squash_permalink),
                })
                .collect();

            raw_users.insert(username.clone(), RawUser { ns });
        }

        let blob = compress_blob(&raw_users).map_err(NotesError::Encode)?;
        let constants = RawConstants {
            users: moderators.into_entries(),
            warnings: note_types.into_entries(),
        };

        Ok(RawUsernotes::new(constants, blob))
    }

    /// Serialize the collection as usernotes page contents
    ///
    /// Pass `None` when writing to the wiki; an indent width is only useful
    /// for debugging output.
    pub fn to_json_string(&self, indent: Option<usize>) -> Result<String, NotesError> {
        let raw = self.to_raw()?;
        to_string_indented(&raw, indent).map_err(NotesError::Serialize)
    }

    fn merge_lowercase_variant(&mut self, canonical: &str, lowercase: &str) {
        let stray = self.users.remove(lowercase).unwrap_or_default();
        debug!(
            "Merging {} notes from '{}' into '{}'",
            stray.len(),
            lowercase,
            canonical
        );

        let notes = self.users.entry(canonical.to_string()).or_default();
        notes.extend(stray.iter().map(|note| note.with_username(canonical)));
        notes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
}

/// Resolve table indices and expand a raw note
fn resolve_note(
    username: &str,
    position: usize,
    raw: RawNote,
    constants: &RawConstants,
) -> Result<Note, NotesError> {
    let moderator_username = raw
        .m
        .and_then(|index| constants.users.get(index).cloned().flatten())
        .ok_or_else(|| NotesError::UnknownModerator {
            username: username.to_string(),
            position,
            index: raw.m,
            table_len: constants.users.len(),
        })?;

    // Note types are cosmetic; a dangling index just drops the type
    let note_type = raw.w.and_then(|index| {
        let key = constants.warnings.get(index).cloned().flatten();
        if key.is_none() {
            warn!(
                "Note #{} on user '{}' references unknown note type index {}",
                position, username, index
            );
        }
        key
    });

    let timestamp = Utc
        .timestamp_opt(raw.t, 0)
        .single()
        .ok_or_else(|| NotesError::InvalidTimestamp {
            username: username.to_string(),
            timestamp: raw.t,
        })?;

    Ok(Note {
        username: username.to_string(),
        text: raw.n,
        timestamp,
        moderator_username,
        note_type,
        context_permalink: raw.l.as_deref().map(expand_permalink),
    })
}

/// Round a timestamp to the nearest second, halves rounding up
fn epoch_seconds(timestamp: DateTime<Utc>) -> i64 {
    (timestamp.timestamp_millis() + 500).div_euclid(1000)
}
