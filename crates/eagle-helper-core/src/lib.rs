//! Shared orchestration for eagle-helper.
//!
//! This crate ties the manifest builders, the translation client, and the
//! sync collaborator together behind explicit context objects: the `I18n`
//! message context (language selection plus resolved-string cache), the
//! helper home configuration (`HelperHome`, `HelperConfig`), the plugin
//! `Workspace`, and the interactive `walk` wizard state machine.

pub mod config;
pub mod i18n;
pub mod walk;
pub mod workspace;

pub use config::{HelperConfig, HelperHome, HOME_ENV};
pub use i18n::{interpolate, I18n, CATALOG_ITEMS, DEFAULT_LANGUAGE};
pub use walk::{run_walk, Prompter, WalkOptions, WalkOutcome, WalkStep};
pub use workspace::Workspace;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] eagle_helper_schema::ManifestError),
    #[error("config error: {0}")]
    Config(String),
    #[error("prompt failed: {0}")]
    Prompt(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
