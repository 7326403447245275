//! Message catalog and the per-process localization context.
//!
//! Every user-facing string has a key and an English default in
//! [`CATALOG_ITEMS`]. An [`I18n`] context resolves keys for the active
//! language: first from its cache, then from the persisted string table for
//! that language, then (if a translator is attached) by asking the local
//! translation server. Resolved strings are cached until the language changes
//! or [`I18n::clear`] is called.
//!
//! Invariants:
//! - Lookups never fail; the English default is the last resort.
//! - A translation that drops a `{placeholder}` is discarded.
//! - After one failed translation the translator is detached for the rest of
//!   the process.

use crate::CoreError;
use eagle_helper_remote::{Translate, DEFAULT_SOURCE_LANGUAGE};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Message keys and their English defaults.
pub const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("cli.about", "Scaffold manifests for Eagle plugins"),
    ("cli.help.language", "Set the language of the helper"),
    ("cli.help.version", "Show the version of the helper"),
    ("cli.help.skip_check", "Skip the utils sync and translate check"),
    ("cli.help.path", "Set the path of the plugin"),
    ("cli.version", "Eagle Helper v{version}"),
    (
        "cli.git_not_installed",
        "Git is not installed, this helper functionality will be very limited.",
    ),
    ("cli.sync.running", "Syncing {repo}..."),
    ("cli.sync.cloned", "Fetched {repo}"),
    ("cli.sync.updated", "Updated {repo}"),
    ("cli.sync.unavailable", "Could not sync {repo}: {reason}"),
    (
        "cli.translate_unavailable",
        "Translation service is not running, using built-in messages.",
    ),
    ("cli.internal.help", "Internal commands"),
    ("cli.builtin.i18ncache.help", "Show the i18n cache"),
    ("cli.internal.translate.help", "Translate a piece of text with the local model"),
    ("cli.init.help", "Initialize a new plugin"),
    ("cli.init.window.help", "Add a window to the plugin"),
    ("cli.service.help", "Add a background service to the plugin"),
    ("cli.inspector.help", "Add an inspector to the plugin"),
    ("cli.walk.help", "Interactively walk through the plugin init process"),
    ("cli.doctor.help", "Check which optional helper features are available"),
    ("cli.completions.help", "Generate shell completions"),
    ("cli.man_pages.help", "Generate man pages"),
    ("init.written", "Wrote {path}"),
    ("init.locales_created", "Created {count} string tables in {dir}"),
    ("walk.welcome", "Welcome to the plugin init process"),
    ("walk.manifest_exists", "Manifest already exists, aborting"),
    ("walk.name", "What is the name of the plugin?"),
    ("walk.name_required", "The plugin name cannot be empty"),
    ("walk.id", "Specify an ID?"),
    ("walk.id.prompt", "What is the ID of the plugin?"),
    ("walk.version", "Specify a version (or 1.0.0)?"),
    ("walk.version.prompt", "What is the version of the plugin?"),
    ("walk.platform", "Specify a platform (or all)?"),
    ("walk.platform.prompt", "What is the platform of the plugin?"),
    ("walk.arch", "Specify an architecture (or all)?"),
    ("walk.arch.prompt", "What is the architecture of the plugin?"),
    ("walk.logo", "Specify a logo (or /logo.png)?"),
    ("walk.logo.prompt", "What is the logo of the plugin?"),
    ("walk.keywords", "Specify keywords (or none)?"),
    ("walk.keywords.prompt", "What are the keywords of the plugin (comma-separated)?"),
    ("walk.locales_support", "Do you want to support i18n?"),
    ("walk.locales_default", "Default language"),
    ("walk.locales_set", "Support the full set or the lite set (en, zh_CN, zh_TW, ja_JP)?"),
    ("walk.locales_custom", "Specify the locales (e.g. en, zh_CN, zh_TW, ja_JP)"),
    ("walk.invalid_locale", "Invalid locale code '{code}', try again"),
    ("walk.written", "Wrote {path}"),
];

/// Replace `{key}` placeholders in `template`.
pub fn interpolate(template: &str, values: &[(&str, String)]) -> String {
    let mut result = template.to_owned();
    for (key, value) in values {
        let placeholder = format!("{{{key}}}");
        result = result.replace(&placeholder, value);
    }
    result
}

fn catalog_default(key: &str) -> Option<&'static str> {
    CATALOG_ITEMS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

fn placeholders(template: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else { break };
        out.push(&rest[start..start + end + 2]);
        rest = &after[end + 1..];
    }
    out
}

fn is_source_language(language: &str) -> bool {
    language == DEFAULT_SOURCE_LANGUAGE || language.starts_with("en_") || language.starts_with("en-")
}

/// Localization context: active language, resolved-string cache, and the
/// optional persisted table and translator for that language.
pub struct I18n {
    language: String,
    cache: BTreeMap<String, String>,
    table: BTreeMap<String, String>,
    table_path: Option<PathBuf>,
    dirty: bool,
    translator: Option<Box<dyn Translate>>,
}

impl Default for I18n {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_owned(),
            cache: BTreeMap::new(),
            table: BTreeMap::new(),
            table_path: None,
            dirty: false,
            translator: None,
        }
    }
}

impl I18n {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Switch language. Clears the cache and loads the string table at
    /// `table_path` if one exists.
    pub fn set_language(&mut self, language: &str, table_path: Option<PathBuf>) {
        let language = language.trim();
        self.language = if language.is_empty() {
            DEFAULT_LANGUAGE.to_owned()
        } else {
            language.to_owned()
        };
        self.clear();
        self.table = table_path
            .as_deref()
            .map(load_table)
            .unwrap_or_default();
        self.table_path = table_path;
        self.dirty = false;
        tracing::debug!(
            "language set to {} ({} stored strings)",
            self.language,
            self.table.len()
        );
    }

    /// Whether the active language differs from the catalog's source language.
    pub fn needs_translation(&self) -> bool {
        !is_source_language(&self.language)
    }

    pub fn set_translator(&mut self, translator: Box<dyn Translate>) {
        self.translator = Some(translator);
    }

    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    /// Drop every resolved string.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &BTreeMap<String, String> {
        &self.cache
    }

    /// Resolve a catalog key. Unknown keys resolve to themselves.
    pub fn text(&mut self, key: &str) -> String {
        let default = catalog_default(key).unwrap_or(key);
        self.lookup(key, default)
    }

    /// Resolve `key`, with `default` as the source text.
    pub fn lookup(&mut self, key: &str, default: &str) -> String {
        if let Some(hit) = self.cache.get(key) {
            return hit.clone();
        }
        let resolved = self.resolve(key, default);
        self.cache.insert(key.to_owned(), resolved.clone());
        resolved
    }

    /// Resolve a catalog key and fill its placeholders.
    pub fn format(&mut self, key: &str, values: &[(&str, String)]) -> String {
        interpolate(&self.text(key), values)
    }

    fn resolve(&mut self, key: &str, default: &str) -> String {
        if is_source_language(&self.language) {
            return default.to_owned();
        }
        if let Some(stored) = self.table.get(key) {
            return stored.clone();
        }
        let Some(translator) = self.translator.as_ref() else {
            return default.to_owned();
        };
        match translator.translate(default, &self.language, DEFAULT_SOURCE_LANGUAGE) {
            Ok(translated) if keeps_placeholders(default, &translated) => {
                self.table.insert(key.to_owned(), translated.clone());
                self.dirty = true;
                translated
            }
            Ok(translated) => {
                tracing::debug!("discarding translation of {key}: placeholders lost in '{translated}'");
                default.to_owned()
            }
            Err(e) => {
                tracing::warn!("translation disabled for this run: {e}");
                self.translator = None;
                default.to_owned()
            }
        }
    }

    /// Write newly translated strings back to the string table, if any.
    pub fn persist(&mut self) -> Result<bool, CoreError> {
        let Some(path) = self.table_path.as_deref() else {
            return Ok(false);
        };
        if !self.dirty {
            return Ok(false);
        }
        save_table(path, &self.table)?;
        self.dirty = false;
        Ok(true)
    }
}

fn keeps_placeholders(source: &str, translated: &str) -> bool {
    !translated.trim().is_empty()
        && placeholders(source)
            .iter()
            .all(|p| translated.contains(p))
}

fn load_table(path: &Path) -> BTreeMap<String, String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!("ignoring unreadable string table {}: {e}", path.display());
        BTreeMap::new()
    })
}

fn save_table(path: &Path, table: &BTreeMap<String, String>) -> Result<(), CoreError> {
    let dir = path
        .parent()
        .ok_or_else(|| CoreError::Config(format!("invalid table path {}", path.display())))?;
    std::fs::create_dir_all(dir)?;
    let content = serde_json::to_string_pretty(table)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| CoreError::Io(e.error))?;
    Ok(())
}
