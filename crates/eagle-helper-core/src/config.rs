use crate::CoreError;
use eagle_helper_remote::TranslatorConfig;
use eagle_helper_runtime::UtilsRepo;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the helper home directory (default `~/.eagle_helper`).
pub const HOME_ENV: &str = "EAGLE_HELPER_HOME";

const HOME_DIR_NAME: &str = ".eagle_helper";
const CONFIG_FILE: &str = "config.json";
const I18N_DIR: &str = "i18n";

/// The per-user configuration area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperHome {
    root: PathBuf,
}

impl HelperHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$EAGLE_HELPER_HOME`, falling back to `~/.eagle_helper`.
    pub fn locate() -> Result<Self, CoreError> {
        if let Some(custom) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(custom));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Config("cannot determine home directory".to_owned()))?;
        Ok(Self::new(home.join(HOME_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Persisted translations of the message catalog for `language`.
    pub fn string_table_path(&self, language: &str) -> PathBuf {
        self.root.join(I18N_DIR).join(format!("{language}.json"))
    }

    pub fn load_config(&self) -> Result<HelperConfig, CoreError> {
        HelperConfig::load(&self.config_path())
    }
}

/// Contents of `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperConfig {
    /// UI language used when `--language` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub utils_repo: UtilsRepo,
}

impl HelperConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CoreError::Config(format!("invalid {}: {e}", path.display())))
    }
}
