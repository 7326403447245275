use crate::entry::WindowEntry;
use crate::types::{Arch, Platform};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// File name of the persisted artifact inside the plugin directory.
pub const MANIFEST_FILE: &str = "manifest.json";

pub const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to persist manifest: {0}")]
    Persist(String),
    #[error("invalid locale code '{0}' (expected letters, digits, '_' or '-')")]
    InvalidLocale(String),
}

/// The `manifest.json` document consumed by the plugin host.
///
/// Field order matches the order keys appear in the written file. Optional
/// fields that were never supplied are skipped on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub arch: Arch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtools: Option<bool>,
    #[serde(default, skip_serializing_if = "MainSection::is_empty")]
    pub main: MainSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector: Option<InspectorSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locales: Option<LocalesSection>,
}

/// Window and background-service surfaces, each kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<WindowEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<WindowEntry>,
}

impl MainSection {
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty() && self.services.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectorSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalesSection {
    pub default: String,
    pub languages: Vec<String>,
}

/// Inputs for [`manifest`]. Unset fields either take their documented
/// default (`plugin_id`, `version`) or stay absent from the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestOptions {
    pub plugin_id: Option<String>,
    pub version: Option<String>,
    pub platform: Platform,
    pub arch: Arch,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub devtools: Option<bool>,
}

impl ManifestOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Build a fresh manifest. A missing `plugin_id` becomes a random v4 UUID
/// and a missing `version` becomes [`DEFAULT_VERSION`].
pub fn manifest(opts: ManifestOptions) -> Manifest {
    let id = opts
        .plugin_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    Manifest {
        id,
        version: opts.version.unwrap_or_else(|| DEFAULT_VERSION.to_owned()),
        platform: opts.platform,
        arch: opts.arch,
        name: opts.name,
        logo: opts.logo,
        keywords: opts.keywords,
        devtools: opts.devtools,
        main: MainSection::default(),
        inspector: None,
        locales: None,
    }
}

/// Append a window entry to `main.windows`.
pub fn add_window(doc: &mut Manifest, entry: WindowEntry) {
    tracing::debug!("adding window {} to {}", entry.url, doc.id);
    doc.main.windows.push(entry);
}

/// Append a background service entry to `main.services`.
pub fn add_background_service(doc: &mut Manifest, entry: WindowEntry) {
    tracing::debug!("adding service {} to {}", entry.url, doc.id);
    doc.main.services.push(entry);
}

/// Declare the plugin as an inspector, optionally restricted to file types.
/// Types accumulate across calls without duplicates.
pub fn add_inspector(doc: &mut Manifest, types: &[String]) {
    let section = doc.inspector.get_or_insert_with(InspectorSection::default);
    for t in types {
        let t = t.trim();
        if !t.is_empty() && !section.types.iter().any(|existing| existing == t) {
            section.types.push(t.to_owned());
        }
    }
}

/// Serialize with four-space indentation. Non-ASCII text is written as-is.
pub fn render_manifest(doc: &Manifest) -> Result<String, ManifestError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| ManifestError::Persist(e.to_string()))
}

/// Write the manifest through a temp file in the same directory and rename
/// it over `dest`, so a crash never leaves a truncated file behind.
pub fn write_manifest(dest: &Path, doc: &Manifest) -> Result<(), ManifestError> {
    let content = render_manifest(doc)?;
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest)
        .map_err(|e| ManifestError::Persist(e.error.to_string()))?;
    tracing::info!("wrote {}", dest.display());
    Ok(())
}

pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    Ok(serde_json::from_str(input)?)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}
