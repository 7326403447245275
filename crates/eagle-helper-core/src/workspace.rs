use crate::CoreError;
use eagle_helper_schema::{Manifest, ManifestError, MANIFEST_FILE};
use std::path::{Path, PathBuf};

/// The plugin directory commands read from and write into.
///
/// Commands receive the workspace explicitly instead of changing the process
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `path` if given (creating it when absent), else the current directory.
    pub fn open(path: Option<&Path>) -> Result<Self, CoreError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    std::fs::create_dir_all(p)?;
                    tracing::debug!("created plugin directory {}", p.display());
                }
                Ok(Self::new(p))
            }
            None => Ok(Self::new(std::env::current_dir()?)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn manifest_exists(&self) -> bool {
        self.manifest_path().exists()
    }

    pub fn save_manifest(&self, doc: &Manifest) -> Result<PathBuf, ManifestError> {
        let path = self.manifest_path();
        eagle_helper_schema::write_manifest(&path, doc)?;
        Ok(path)
    }

    pub fn load_manifest(&self) -> Result<Manifest, ManifestError> {
        eagle_helper_schema::parse_manifest_file(self.manifest_path())
    }
}
