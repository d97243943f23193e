//! Toolbox Core Library
//!
//! This crate reads and writes the usernotes page that moderation tools keep
//! on a subreddit wiki: a versioned JSON document holding a compressed,
//! deduplicated record of notes left on users.
//!
//! # Architecture
//!
//! ```text
//! page text -> schema migration -> blob decompression -> Usernotes
//! Usernotes -> fresh lookup tables + blob compression -> page text
//! ```
//!
//! Everything is synchronous and in-memory. Fetching and saving the page is
//! left to the caller (see the `toolbox-client` crate).
//!
//! # Quick Start
//!
//! ```text
//! let mut notes = Usernotes::from_json(&page_contents)?;
//!
//! notes.add(NewNote::new("someUser", "Warned for spam", "someMod"));
//! let history = notes.get("someUser");
//!
//! let updated = notes.to_json_string(None)?;
//! ```
//!
//! # Modules
//!
//! - `usernotes`: The note collection (main entry point)
//! - `models`: Note data structures
//! - `schema`: Schema versions and migrations
//! - `raw`: Wire types for the current schema
//! - `blob`: Compressed blob codec
//! - `permalink`: Context link shortening
//! - `settings`: Subreddit config page (note type definitions)
//! - `error`: Usernotes errors

pub mod blob;
pub mod error;
mod json;
pub mod models;
pub mod permalink;
pub mod raw;
pub mod schema;
pub mod settings;
pub mod usernotes;

pub use blob::{compress_blob, decompress_blob, BlobError};
pub use error::NotesError;
pub use models::{NewNote, Note};
pub use permalink::{expand_permalink, squash_permalink};
pub use raw::RawUsernotes;
pub use schema::{migrate, SchemaError, EARLIEST_SCHEMA_VERSION, LATEST_SCHEMA_VERSION};
pub use settings::{NoteType, SettingsError, SubredditConfig};
pub use usernotes::Usernotes;
