//! Toolbox Client Library
//!
//! Connects the usernotes engine in `toolbox-core` to a wiki. The wiki
//! itself is abstracted behind [`WikiStore`]; the host application provides
//! the implementation for its platform.
//!
//! # Modules
//!
//! - `client`: Read/modify/write cycle for notes and config (main entry point)
//! - `store`: Wiki page storage trait and in-memory implementation
//! - `config`: Client configuration

pub mod client;
pub mod config;
pub mod store;

pub use client::ToolboxClient;
pub use config::ClientConfig;
pub use store::{MemoryWikiStore, PageKey, Revision, WikiStore};
