//! Where the catalog document and the assets tree live.
//!
//! Values are resolved in priority order:
//! 1. an explicit value (command-line flag or FFI argument),
//! 2. an environment variable,
//! 3. a TOML config file,
//! 4. the defaults under `./assets`.
//!
//! Every candidate goes through [`normalize_path`] so quoted or relative
//! paths pasted by an operator behave.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::catalog_error::{CatalogError, Result};
use crate::path_utils::normalize_path;

pub const JSON_PATH_ENV: &str = "DIVINE_JSON_PATH";
pub const ASSETS_PATH_ENV: &str = "DIVINE_ASSETS_PATH";

const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_DOCUMENT_NAME: &str = "gods_songs.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    /// The catalog JSON document.
    pub json_path: PathBuf,
    /// Root of the `images/`, `audio/` and `lyrics/` directories.
    pub assets_path: PathBuf,
}

/// Raw, possibly missing values for each setting.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfigOverrides {
    pub json_path: Option<String>,
    pub assets_path: Option<String>,
}

impl ConfigOverrides {
    /// Reads a TOML file with optional `json_path` and `assets_path` keys.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CatalogError::Config(format!("Invalid config file {}: {e}", path.display())))
    }

    pub fn from_env() -> Self {
        Self {
            json_path: std::env::var(JSON_PATH_ENV).ok(),
            assets_path: std::env::var(ASSETS_PATH_ENV).ok(),
        }
    }

    /// Fills settings missing here from `fallback`.
    pub fn or(self, fallback: ConfigOverrides) -> Self {
        Self {
            json_path: non_blank(self.json_path).or_else(|| non_blank(fallback.json_path)),
            assets_path: non_blank(self.assets_path).or_else(|| non_blank(fallback.assets_path)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let assets = normalize_path(DEFAULT_ASSETS_DIR).unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));
        Self {
            json_path: assets.join(DEFAULT_DOCUMENT_NAME),
            assets_path: assets,
        }
    }
}

impl CatalogConfig {
    pub fn new(json_path: impl Into<PathBuf>, assets_path: impl Into<PathBuf>) -> Self {
        Self {
            json_path: json_path.into(),
            assets_path: assets_path.into(),
        }
    }

    /// Builds a config from raw values, substituting defaults for anything
    /// missing or blank.
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        let defaults = Self::default();
        Self {
            json_path: overrides
                .json_path
                .as_deref()
                .and_then(normalize_path)
                .unwrap_or(defaults.json_path),
            assets_path: overrides
                .assets_path
                .as_deref()
                .and_then(normalize_path)
                .unwrap_or(defaults.assets_path),
        }
    }

    /// Resolves `explicit` values, then the environment, then an optional
    /// TOML file, then defaults.
    pub fn load(explicit: ConfigOverrides, config_file: Option<&Path>) -> Result<Self> {
        let mut merged = explicit.or(ConfigOverrides::from_env());
        if let Some(file) = config_file {
            merged = merged.or(ConfigOverrides::from_toml_file(file)?);
        }
        Ok(Self::resolve(merged))
    }

    /// Checks that both locations are usable without creating anything.
    ///
    /// The document must exist, be non-empty and parse as JSON; the assets
    /// root must be an existing directory.
    pub fn validate(&self) -> Result<()> {
        if !self.json_path.is_file() {
            return Err(CatalogError::DocumentNotFound(self.json_path.clone()));
        }
        if !self.assets_path.is_dir() {
            return Err(CatalogError::Config(format!(
                "Assets directory not found at {}",
                self.assets_path.display()
            )));
        }

        let content = fs::read_to_string(&self.json_path)?;
        if content.trim().is_empty() {
            return Err(CatalogError::MalformedDocument(format!(
                "{} is empty, expected at least {{\"version\": \"20241008000000\", \"gods\": []}}",
                self.json_path.display()
            )));
        }
        serde_json::from_str::<serde_json::Value>(&content)
            .map_err(|e| CatalogError::MalformedDocument(e.to_string()))?;

        info!(
            "Configuration valid: document {}, assets {}",
            self.json_path.display(),
            self.assets_path.display()
        );
        Ok(())
    }
}
