//! Wiki page storage
//!
//! The client never talks to a network itself. It reads and writes whole
//! page contents through a [`WikiStore`], which a host application
//! implements on top of its platform's wiki API.
//!
//! [`MemoryWikiStore`] keeps every revision in memory and is used for
//! embedding and tests.

use std::collections::HashMap;

use anyhow::Result;

/// Identifies a single wiki page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub subreddit: String,
    pub page: String,
}

impl PageKey {
    pub fn new(subreddit: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            subreddit: subreddit.into(),
            page: page.into(),
        }
    }
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/r/{}/wiki/{}", self.subreddit, self.page)
    }
}

/// Whole-page read/write access to a wiki
pub trait WikiStore {
    /// Read the current contents of a page
    ///
    /// A page that doesn't exist yet reads as an empty string.
    fn read(&self, key: &PageKey) -> Result<String>;

    /// Replace the contents of a page
    fn write(&mut self, key: &PageKey, content: &str, reason: &str) -> Result<()>;
}

/// A single saved version of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub content: String,
    pub reason: String,
}

/// In-memory wiki keeping the full revision history of every page
#[derive(Debug, Default)]
pub struct MemoryWikiStore {
    pages: HashMap<PageKey, Vec<Revision>>,
}

impl MemoryWikiStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All revisions of a page, oldest first
    pub fn revisions(&self, key: &PageKey) -> &[Revision] {
        self.pages.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The most recent revision of a page
    pub fn latest(&self, key: &PageKey) -> Option<&Revision> {
        self.revisions(key).last()
    }
}

impl WikiStore for MemoryWikiStore {
    fn read(&self, key: &PageKey) -> Result<String> {
        Ok(self
            .latest(key)
            .map(|revision| revision.content.clone())
            .unwrap_or_default())
    }

    fn write(&mut self, key: &PageKey, content: &str, reason: &str) -> Result<()> {
        self.pages.entry(key.clone()).or_default().push(Revision {
            content: content.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_page_reads_empty() {
        let store = MemoryWikiStore::new();
        let key = PageKey::new("sub", "usernotes");
        assert_eq!(store.read(&key).unwrap(), "");
        assert!(store.revisions(&key).is_empty());
        assert!(store.latest(&key).is_none());
    }

    #[test]
    fn test_write_keeps_history() {
        let mut store = MemoryWikiStore::new();
        let key = PageKey::new("sub", "usernotes");

        store.write(&key, "first", "create").unwrap();
        store.write(&key, "second", "update").unwrap();

        assert_eq!(store.read(&key).unwrap(), "second");
        assert_eq!(store.revisions(&key).len(), 2);
        assert_eq!(store.revisions(&key)[0].reason, "create");
        assert_eq!(store.latest(&key).unwrap().reason, "update");
    }

    #[test]
    fn test_pages_are_independent() {
        let mut store = MemoryWikiStore::new();
        let notes = PageKey::new("sub", "usernotes");
        let settings = PageKey::new("sub", "toolbox");
        let other_sub = PageKey::new("other", "usernotes");

        store.write(&notes, "notes", "reason").unwrap();

        assert_eq!(store.read(&notes).unwrap(), "notes");
        assert_eq!(store.read(&settings).unwrap(), "");
        assert_eq!(store.read(&other_sub).unwrap(), "");
    }

    #[test]
    fn test_page_key_display() {
        let key = PageKey::new("mildlyinteresting", "usernotes");
        assert_eq!(key.to_string(), "/r/mildlyinteresting/wiki/usernotes");
    }
}
