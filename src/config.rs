//! Runtime configuration for the local tooling.
//!
//! Stored as JSON; every field has a default so an empty object is a valid file.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{DrapeError, DrapeResult};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Settings for the file-backed gateways and the CLI.
pub struct DrapeConfig {
    /// Directory holding `<id>.json` composition records and thumbnails.
    pub library_root: PathBuf,
    /// Account stamped on newly saved compositions.
    pub owner_id: String,
    /// JSON catalog of garments; no catalog means every identity is unknown.
    pub catalog_path: Option<PathBuf>,
    /// Per-channel tolerance for backdrop keying.
    pub key_tolerance: u8,
}

impl Default for DrapeConfig {
    fn default() -> Self {
        Self {
            library_root: PathBuf::from("library"),
            owner_id: "local".to_string(),
            catalog_path: None,
            key_tolerance: 24,
        }
    }
}

impl DrapeConfig {
    /// Read and validate a config file. Relative paths resolve against the file's
    /// directory.
    pub fn from_json_file(path: &Path) -> DrapeResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        let mut cfg: DrapeConfig = serde_json::from_slice(&bytes)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.library_root = base.join(&cfg.library_root);
        cfg.catalog_path = cfg.catalog_path.map(|p| base.join(p));
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check field-level rules.
    pub fn validate(&self) -> DrapeResult<()> {
        if self.owner_id.trim().is_empty() {
            return Err(DrapeError::validation("ownerId must be non-empty"));
        }
        if self.library_root.as_os_str().is_empty() {
            return Err(DrapeError::validation("libraryRoot must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
