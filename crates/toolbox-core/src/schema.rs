//! Usernotes schema versions and migrations
//!
//! Pages written by older clients are upgraded in place, one version at a
//! time, by an explicit ordered list of [`MigrationStep`]s. Each step
//! operates on the untyped JSON document and stamps the version it produces,
//! so a document already at [`LATEST_SCHEMA_VERSION`] passes through
//! untouched.
//!
//! ## Known versions
//!
//! - **4**: plaintext `users` field, timestamps in milliseconds
//! - **5**: plaintext `users` field, timestamps in seconds
//! - **6**: `users` compressed into `blob`

use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::debug;

use crate::blob::{compress_blob, BlobError};
use crate::error::NotesError;
use crate::raw::RawUsernotes;

/// Latest usernotes schema version this crate can read and write
pub const LATEST_SCHEMA_VERSION: i64 = 6;

/// Earliest usernotes schema version this crate can upgrade
pub const EARLIEST_SCHEMA_VERSION: i64 = 4;

/// Document keys touched by migrations
mod keys {
    pub const VERSION: &str = "ver";
    pub const USERS: &str = "users";
    pub const BLOB: &str = "blob";
    pub const NOTES: &str = "ns";
    pub const TIMESTAMP: &str = "t";
}

/// Errors raised while checking or upgrading a document's schema
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unknown schema version {version} (earliest known version is {earliest})")]
    TooOld { version: i64, earliest: i64 },

    #[error("Unknown schema version {version} (latest known version is {latest})")]
    TooNew { version: i64, latest: i64 },

    #[error("Document has no integer schema version")]
    MissingVersion,

    #[error("Document is not a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Failed to compress users during migration: {0}")]
    Blob(#[from] BlobError),
}

/// A single forward migration from `from` to `from + 1`
pub struct MigrationStep {
    /// Version this step upgrades from
    pub from: i64,
    /// Human-readable description for logs
    pub name: &'static str,
    /// Transformation applied to the document body
    pub apply: fn(&mut Map<String, Value>) -> Result<(), SchemaError>,
}

/// All migrations, in the order they must run
pub const MIGRATIONS: &[MigrationStep] = &[
    MigrationStep {
        from: 4,
        name: "convert note timestamps from milliseconds to seconds",
        apply: timestamps_to_seconds,
    },
    MigrationStep {
        from: 5,
        name: "compress users into blob",
        apply: users_to_blob,
    },
];

/// Read a document's version and check it against a supported range
pub fn check_version(
    document: &Map<String, Value>,
    earliest: i64,
    latest: i64,
) -> Result<i64, SchemaError> {
    let version = document
        .get(keys::VERSION)
        .and_then(Value::as_i64)
        .ok_or(SchemaError::MissingVersion)?;

    if version < earliest {
        return Err(SchemaError::TooOld { version, earliest });
    }
    if version > latest {
        return Err(SchemaError::TooNew { version, latest });
    }
    Ok(version)
}

/// Upgrade an untyped usernotes document to the latest schema version
pub fn migrate_value(document: Value) -> Result<Value, SchemaError> {
    let Value::Object(mut document) = document else {
        return Err(SchemaError::NotAnObject);
    };

    let version = check_version(&document, EARLIEST_SCHEMA_VERSION, LATEST_SCHEMA_VERSION)?;

    for step in MIGRATIONS.iter().filter(|step| step.from >= version) {
        debug!(
            "Migrating usernotes schema {} -> {}: {}",
            step.from,
            step.from + 1,
            step.name
        );
        (step.apply)(&mut document)?;
        document.insert(keys::VERSION.to_string(), Value::from(step.from + 1));
    }

    Ok(Value::Object(document))
}

/// Upgrade a usernotes document and parse it into the current wire types
pub fn migrate(document: Value) -> Result<RawUsernotes, NotesError> {
    let migrated = migrate_value(document)?;
    serde_json::from_value(migrated).map_err(NotesError::Malformed)
}

/// 4 -> 5: note timestamps were stored in milliseconds
fn timestamps_to_seconds(document: &mut Map<String, Value>) -> Result<(), SchemaError> {
    let users = document
        .get_mut(keys::USERS)
        .and_then(Value::as_object_mut)
        .ok_or(SchemaError::MissingField(keys::USERS))?;

    let notes = users
        .values_mut()
        .filter_map(|user| user.get_mut(keys::NOTES))
        .filter_map(Value::as_array_mut)
        .flatten();

    for note in notes {
        let Some(timestamp) = note.get_mut(keys::TIMESTAMP) else {
            continue;
        };
        if let Some(seconds) = millis_to_seconds(timestamp) {
            *timestamp = seconds;
        }
    }

    Ok(())
}

/// Divide a millisecond timestamp by 1000, keeping it integral when exact
///
/// Zero and non-numeric values are left alone.
fn millis_to_seconds(millis: &Value) -> Option<Value> {
    if let Some(ms) = millis.as_i64() {
        if ms == 0 {
            return None;
        }
        if ms % 1000 == 0 {
            return Some(Value::from(ms / 1000));
        }
    }

    let ms = millis.as_f64()?;
    if ms == 0.0 {
        return None;
    }
    Number::from_f64(ms / 1000.0).map(Value::Number)
}

/// 5 -> 6: the users mapping moved into a compressed blob
fn users_to_blob(document: &mut Map<String, Value>) -> Result<(), SchemaError> {
    let users = document
        .remove(keys::USERS)
        .ok_or(SchemaError::MissingField(keys::USERS))?;
    let blob = compress_blob(&users)?;
    document.insert(keys::BLOB.to_string(), Value::String(blob));
    Ok(())
}
