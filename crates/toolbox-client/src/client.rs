//! Toolbox client
//!
//! `ToolboxClient` runs the read -> modify -> write cycle against a
//! [`WikiStore`]:
//!
//! 1. Read the current page contents
//! 2. Parse them into a [`Usernotes`] collection (migrating old schemas)
//! 3. Apply the change
//! 4. Write the minified result back with a revision reason
//!
//! There is no locking; if two writers race, the last write wins.
//!
//! ## Usage
//!
//! ```ignore
//! let mut client = ToolboxClient::new(store);
//!
//! client.add_usernote("mildlyinteresting", NewNote::new("someUser", "Spam", "someMod"), None)?;
//! let notes = client.usernotes("mildlyinteresting")?.get("someUser");
//! ```

use anyhow::{Context, Result};
use tracing::{debug, info};

use toolbox_core::{NewNote, SubredditConfig, Usernotes};

use crate::config::ClientConfig;
use crate::store::{PageKey, WikiStore};

/// Client for reading and writing usernotes through a wiki store
pub struct ToolboxClient<S> {
    store: S,
    config: ClientConfig,
}

impl<S: WikiStore> ToolboxClient<S> {
    /// Create a client with the default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, ClientConfig::default())
    }

    /// Create a client with a specific configuration
    pub fn with_config(store: S, config: ClientConfig) -> Self {
        Self { store, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the client and return the underlying store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Key of a subreddit's usernotes page
    pub fn notes_page(&self, subreddit: &str) -> PageKey {
        PageKey::new(subreddit, &self.config.notes_page)
    }

    /// Key of a subreddit's config page
    pub fn settings_page(&self, subreddit: &str) -> PageKey {
        PageKey::new(subreddit, &self.config.settings_page)
    }

    /// Revision reason used when creating a note without an explicit one
    pub fn default_reason(&self, username: &str) -> String {
        format!(
            "create new note on user {} via {}",
            username, self.config.app_name
        )
    }

    // ==================== Usernotes ====================

    /// Read and parse a subreddit's usernotes
    pub fn usernotes(&self, subreddit: &str) -> Result<Usernotes> {
        let key = self.notes_page(subreddit);
        debug!("Reading usernotes from {}", key);

        let contents = self
            .store
            .read(&key)
            .with_context(|| format!("Failed to read {}", key))?;

        Usernotes::from_json(&contents).with_context(|| format!("Failed to parse usernotes in {}", key))
    }

    /// Write a usernotes collection back to a subreddit's wiki
    pub fn save_usernotes(&mut self, subreddit: &str, notes: &Usernotes, reason: &str) -> Result<()> {
        let key = self.notes_page(subreddit);
        let contents = notes
            .to_json_string(None)
            .context("Failed to serialize usernotes")?;

        debug!("Writing {} bytes of usernotes to {}", contents.len(), key);
        self.store
            .write(&key, &contents, reason)
            .with_context(|| format!("Failed to write {}", key))
    }

    /// Add a single note to a subreddit's usernotes
    ///
    /// Uses [`Self::default_reason`] when no revision reason is given.
    pub fn add_usernote(
        &mut self,
        subreddit: &str,
        note: NewNote,
        reason: Option<&str>,
    ) -> Result<()> {
        let mut notes = self.usernotes(subreddit)?;

        let reason = reason
            .map(str::to_string)
            .unwrap_or_else(|| self.default_reason(&note.username));

        info!("Adding usernote on {} in /r/{}", note.username, subreddit);
        notes.add(note);

        self.save_usernotes(subreddit, &notes, &reason)
    }

    // ==================== Subreddit config ====================

    /// Read and parse a subreddit's config page
    pub fn subreddit_config(&self, subreddit: &str) -> Result<SubredditConfig> {
        let key = self.settings_page(subreddit);
        debug!("Reading subreddit config from {}", key);

        let contents = self
            .store
            .read(&key)
            .with_context(|| format!("Failed to read {}", key))?;

        SubredditConfig::from_json(&contents)
            .with_context(|| format!("Failed to parse subreddit config in {}", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryWikiStore;
    use toolbox_core::{decompress_blob, NotesError, RawUsernotes};

    fn client() -> ToolboxClient<MemoryWikiStore> {
        ToolboxClient::new(MemoryWikiStore::new())
    }

    #[test]
    fn test_default_reason() {
        let client = client();
        assert_eq!(
            client.default_reason("someUser"),
            "create new note on user someUser via toolbox-notes"
        );
    }

    #[test]
    fn test_page_keys_follow_config() {
        let config = ClientConfig::load_from_str(r#"notes_page = "notes_v2""#).unwrap();
        let client = ToolboxClient::with_config(MemoryWikiStore::new(), config);

        assert_eq!(client.notes_page("sub"), PageKey::new("sub", "notes_v2"));
        assert_eq!(client.settings_page("sub"), PageKey::new("sub", "toolbox"));
    }

    #[test]
    fn test_usernotes_on_missing_page() {
        let client = client();
        let notes = client.usernotes("sub").unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_add_usernote_with_default_reason() {
        let mut client = client();
        client
            .add_usernote("sub", NewNote::new("someUser", "first note", "someMod"), None)
            .unwrap();

        let key = client.notes_page("sub");
        let revision = client.store().latest(&key).unwrap();
        assert_eq!(
            revision.reason,
            "create new note on user someUser via toolbox-notes"
        );
        assert!(!revision.content.contains('\n'));

        let mut notes = client.usernotes("sub").unwrap();
        let user_notes = notes.get("someUser");
        assert_eq!(user_notes.len(), 1);
        assert_eq!(user_notes[0].text, "first note");
        assert_eq!(user_notes[0].moderator_username, "someMod");
    }

    #[test]
    fn test_add_usernote_with_explicit_reason() {
        let mut client = client();
        client
            .add_usernote(
                "sub",
                NewNote::new("someUser", "note", "someMod"),
                Some("custom reason"),
            )
            .unwrap();

        let key = client.notes_page("sub");
        assert_eq!(client.store().latest(&key).unwrap().reason, "custom reason");
    }

    #[test]
    fn test_add_usernote_keeps_existing_notes() {
        let mut client = client();
        client
            .add_usernote("sub", NewNote::new("someUser", "one", "modA"), None)
            .unwrap();
        client
            .add_usernote("sub", NewNote::new("someUser", "two", "modB"), None)
            .unwrap();

        let key = client.notes_page("sub");
        assert_eq!(client.store().revisions(&key).len(), 2);

        let notes = client.usernotes("sub").unwrap();
        let texts: Vec<_> = notes
            .notes_for("someUser")
            .iter()
            .map(|note| note.text.as_str())
            .collect();
        assert_eq!(texts, vec!["two", "one"]);

        let raw: RawUsernotes =
            serde_json::from_str(&client.store().read(&key).unwrap()).unwrap();
        assert_eq!(raw.constants.users.len(), 2);
        let users: serde_json::Value = decompress_blob(&raw.blob).unwrap();
        assert_eq!(users["someUser"]["ns"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unsupported_page_is_not_overwritten() {
        let mut store = MemoryWikiStore::new();
        let key = PageKey::new("sub", "usernotes");
        store
            .write(&key, r#"{"ver":7,"constants":{},"blob":""}"#, "future client")
            .unwrap();

        let mut client = ToolboxClient::new(store);
        let err = client
            .add_usernote("sub", NewNote::new("someUser", "note", "someMod"), None)
            .unwrap_err();

        let notes_err = err.downcast_ref::<NotesError>().unwrap();
        assert!(notes_err.is_unsupported_schema());
        assert_eq!(client.store().revisions(&key).len(), 1);
    }

    #[test]
    fn test_subreddit_config() {
        let mut store = MemoryWikiStore::new();
        store
            .write(
                &PageKey::new("sub", "toolbox"),
                r#"{"ver":1,"usernoteColors":[{"key":"watch","color":"blue","text":"Watch"}]}"#,
                "setup",
            )
            .unwrap();

        let client = ToolboxClient::new(store);
        let mut config = client.subreddit_config("sub").unwrap();
        assert_eq!(config.note_type("watch").unwrap().text, "Watch");

        let mut empty = client.subreddit_config("other").unwrap();
        assert_eq!(empty.note_types().len(), 7);
    }
}
