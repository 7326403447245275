//! Locale sets and `_locales/` string-table scaffolding.

use crate::manifest::{LocalesSection, Manifest, ManifestError};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Directory, relative to the plugin root, that holds one string table per language.
pub const LOCALES_DIR: &str = "_locales";

pub const LITE_SET_OF_LOCALES: &[&str] = &["en", "zh_CN", "zh_TW", "ja_JP"];

pub const FULL_SET_OF_LOCALES: &[&str] = &[
    "ja_JP", "ko_KR", "ru_RU", "zh_CN", "zh_TW", "de_DE", "en", "es_ES",
];

/// Ordered set of language codes. Insertion order is kept and duplicates
/// are dropped on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSet(Vec<String>);

impl LocaleSet {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for code in codes {
            set.insert(code.as_ref());
        }
        set
    }

    pub fn lite() -> Self {
        Self::new(LITE_SET_OF_LOCALES)
    }

    pub fn full() -> Self {
        Self::new(FULL_SET_OF_LOCALES)
    }

    /// Resolve a named set (`"lite"` or `"full"`).
    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lite" => Some(Self::lite()),
            "full" => Some(Self::full()),
            _ => None,
        }
    }

    /// Parse a comma-separated list such as `"en, zh_CN,ja_JP"`.
    pub fn parse_custom(input: &str) -> Self {
        Self::new(input.split(',').map(str::trim))
    }

    /// Add `code` unless already present or blank. Returns whether it was added.
    pub fn insert(&mut self, code: &str) -> bool {
        let code = code.trim();
        if code.is_empty() || self.contains(code) {
            return false;
        }
        self.0.push(code.to_owned());
        true
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// A locale code becomes a file name, so it is restricted to a safe alphabet.
pub fn validate_locale_code(code: &str) -> Result<(), ManifestError> {
    let valid = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ManifestError::InvalidLocale(code.to_owned()))
    }
}

/// One string table resource to be created for a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    pub language: String,
    /// Path relative to the plugin root, e.g. `_locales/ja_JP.json`.
    pub path: PathBuf,
}

/// The string tables `setup_locales` decided on, not yet on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleScaffold {
    pub tables: Vec<StringTable>,
}

impl LocaleScaffold {
    /// Create every missing table under `root` as an empty JSON object.
    /// Tables that already exist are left untouched. Returns the paths created.
    pub fn materialize(&self, root: &Path) -> Result<Vec<PathBuf>, ManifestError> {
        let mut created = Vec::new();
        if self.tables.is_empty() {
            return Ok(created);
        }
        fs::create_dir_all(root.join(LOCALES_DIR))?;
        for table in &self.tables {
            let dest = root.join(&table.path);
            match OpenOptions::new().write(true).create_new(true).open(&dest) {
                Ok(mut file) => {
                    file.write_all(b"{}\n")?;
                    tracing::debug!("created string table {}", dest.display());
                    created.push(dest);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!("keeping existing string table {}", dest.display());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(created)
    }
}

/// Wire locale configuration into `doc` and plan one string table per language.
///
/// `default_language` is appended to `languages` when missing; the rest of the
/// order is preserved as given.
pub fn setup_locales(
    doc: &mut Manifest,
    default_language: &str,
    languages: &LocaleSet,
) -> Result<LocaleScaffold, ManifestError> {
    let default_language = default_language.trim();
    validate_locale_code(default_language)?;
    for code in languages.iter() {
        validate_locale_code(code)?;
    }

    let mut set = languages.clone();
    set.insert(default_language);

    let tables = set
        .iter()
        .map(|code| StringTable {
            language: code.to_owned(),
            path: Path::new(LOCALES_DIR).join(format!("{code}.json")),
        })
        .collect();

    doc.locales = Some(LocalesSection {
        default: default_language.to_owned(),
        languages: set.into_vec(),
    });
    Ok(LocaleScaffold { tables })
}
