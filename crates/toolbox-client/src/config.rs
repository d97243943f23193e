//! Client configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. A TOML config file or string
//!
//! Every field is optional; missing fields fall back to their defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Wiki page where usernotes are stored
const DEFAULT_NOTES_PAGE: &str = "usernotes";

/// Wiki page where the subreddit config is stored
const DEFAULT_SETTINGS_PAGE: &str = "toolbox";

/// Name used in default revision reasons
const DEFAULT_APP_NAME: &str = "toolbox-notes";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Wiki page holding usernotes
    #[serde(default = "default_notes_page")]
    pub notes_page: String,

    /// Wiki page holding the subreddit config
    #[serde(default = "default_settings_page")]
    pub settings_page: String,

    /// Application name appended to default revision reasons
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            notes_page: default_notes_page(),
            settings_page: default_settings_page(),
            app_name: default_app_name(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a specific path
    ///
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        toml::from_str(toml_content).context("Failed to parse config TOML")
    }
}

fn default_notes_page() -> String {
    DEFAULT_NOTES_PAGE.to_string()
}

fn default_settings_page() -> String {
    DEFAULT_SETTINGS_PAGE.to_string()
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.notes_page, "usernotes");
        assert_eq!(config.settings_page, "toolbox");
        assert_eq!(config.app_name, "toolbox-notes");
    }

    #[test]
    fn test_load_from_str() {
        let toml = r#"
            notes_page = "usernotes_test"
            app_name = "my-bot"
        "#;

        let config = ClientConfig::load_from_str(toml).unwrap();
        assert_eq!(config.notes_page, "usernotes_test");
        assert_eq!(config.settings_page, "toolbox");
        assert_eq!(config.app_name, "my-bot");
    }

    #[test]
    fn test_load_from_str_invalid() {
        assert!(ClientConfig::load_from_str("notes_page = [").is_err());
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"settings_page = "config""#).unwrap();

        let config = ClientConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.settings_page, "config");
        assert_eq!(config.notes_page, "usernotes");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let config = ClientConfig::load_from_path(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_serialization() {
        let config = ClientConfig {
            notes_page: "notes".to_string(),
            settings_page: "settings".to_string(),
            app_name: "app".to_string(),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}
