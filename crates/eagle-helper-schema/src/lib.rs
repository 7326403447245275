//! Plugin manifest model, builders, and locale scaffolding for eagle-helper.
//!
//! This crate defines the document layer: the typed `manifest.json` model
//! (`Manifest`, `WindowEntry`), the builder operations that create and extend
//! it (`manifest`, `add_window`, `add_background_service`), the locale sets
//! and the `_locales/` string-table scaffolding (`setup_locales`), and the
//! serialization used for the persisted artifact.

pub mod entry;
pub mod locales;
pub mod manifest;
pub mod types;

pub use entry::WindowEntry;
pub use locales::{
    setup_locales, validate_locale_code, LocaleScaffold, LocaleSet, StringTable,
    FULL_SET_OF_LOCALES, LITE_SET_OF_LOCALES, LOCALES_DIR,
};
pub use manifest::{
    add_background_service, add_inspector, add_window, manifest, parse_manifest_file,
    parse_manifest_str, render_manifest, write_manifest, InspectorSection, LocalesSection,
    MainSection, Manifest, ManifestError, ManifestOptions, DEFAULT_VERSION, MANIFEST_FILE,
};
pub use types::{Arch, Platform};
