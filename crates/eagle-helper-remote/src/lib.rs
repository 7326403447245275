//! Translation client for eagle-helper.
//!
//! Talks to an OpenAI-compatible chat-completion server running on the local
//! machine. The client offers a cheap capability probe (`able_to_translate`)
//! and a single-shot translation call (`help_me_translate`). Both are
//! advisory: nothing in manifest generation depends on them succeeding.

pub mod config;
pub mod http;

pub use config::TranslatorConfig;
pub use http::{extract_translation, HttpTranslator, THINK_END_MARKER};

use thiserror::Error;

/// Source language assumed when the caller does not name one.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("translation failed with status code {0}")]
    Status(u16),
    #[error("malformed translation response: {0}")]
    MalformedResponse(String),
    #[error("translation response has no '{marker}' marker")]
    MissingMarker { marker: &'static str },
}

/// Something that can translate a piece of UI text.
pub trait Translate {
    fn translate(
        &self,
        text: &str,
        target_language: &str,
        src_language: &str,
    ) -> Result<String, TranslateError>;
}
