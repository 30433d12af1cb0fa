//! Media files referenced by catalog records.
//!
//! Files live under a single assets root, one fixed sub-directory per
//! category. Records only store the base filename; the category decides the
//! directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::catalog_error::{CatalogError, Result};

/// Kind of media file, which fixes its directory under the assets root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    /// God pictures, `images/`.
    Images,
    /// Song audio, `audio/`.
    Audio,
    /// `lyrics/telugu/`
    LyricsTelugu,
    /// `lyrics/english/`
    LyricsEnglish,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 4] = [
        AssetCategory::Images,
        AssetCategory::Audio,
        AssetCategory::LyricsTelugu,
        AssetCategory::LyricsEnglish,
    ];

    /// Path of this category relative to the assets root.
    pub fn relative_dir(&self) -> PathBuf {
        match self {
            AssetCategory::Images => PathBuf::from("images"),
            AssetCategory::Audio => PathBuf::from("audio"),
            AssetCategory::LyricsTelugu => Path::new("lyrics").join("telugu"),
            AssetCategory::LyricsEnglish => Path::new("lyrics").join("english"),
        }
    }
}

/// A file to bring into the assets tree.
///
/// Uploads arrive as staging copies that are removed once they have been
/// copied; files an operator points at directly are left where they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSource {
    pub path: PathBuf,

    #[serde(default)]
    pub keep_source: bool,
}

impl AssetSource {
    /// A staging copy, deleted after it has been stored.
    pub fn staged(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), keep_source: false }
    }

    /// An operator-owned file, left in place.
    pub fn keep(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), keep_source: true }
    }
}

/// Copies assets into and removes them from the category directories.
#[derive(Debug, Clone)]
pub struct AssetManager {
    root: PathBuf,
}

impl AssetManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: AssetCategory) -> PathBuf {
        self.root.join(category.relative_dir())
    }

    /// Full path of `filename` inside `category`.
    ///
    /// Only the final component of `filename` is used, so a record can never
    /// point outside its category directory.
    pub fn asset_path(&self, category: AssetCategory, filename: &str) -> Option<PathBuf> {
        Path::new(filename)
            .file_name()
            .map(|name| self.category_dir(category).join(name))
    }

    /// Copies `source` into `category` under its original base filename and
    /// returns that filename.
    ///
    /// The category directory is created when missing. A file with the same
    /// name already present is overwritten. Staging sources are deleted after
    /// the copy.
    pub fn store(&self, source: &AssetSource, category: AssetCategory) -> Result<String> {
        let src = &source.path;
        if !src.is_file() {
            return Err(CatalogError::SourceNotFound(src.clone()));
        }

        let filename = src
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                CatalogError::validation(format!(
                    "Asset source has no usable file name: {}",
                    src.display()
                ))
            })?;

        let dir = self.category_dir(category);
        fs::create_dir_all(&dir)?;
        let dest = dir.join(&filename);

        if same_file(src, &dest) {
            debug!("Asset {} already in place", dest.display());
            return Ok(filename);
        }

        fs::copy(src, &dest)?;
        info!("Stored asset {} -> {}", src.display(), dest.display());

        if !source.keep_source {
            fs::remove_file(src)?;
            debug!("Removed staging file {}", src.display());
        }

        Ok(filename)
    }

    /// Deletes `filename` from `category`.
    ///
    /// An empty filename or a file that is already gone is not an error; any
    /// other failure (permissions, a directory in the way) is.
    pub fn remove(&self, category: AssetCategory, filename: &str) -> Result<()> {
        if filename.trim().is_empty() {
            return Ok(());
        }
        let Some(path) = self.asset_path(category, filename) else {
            return Ok(());
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed asset {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Asset {} already absent", path.display());
                Ok(())
            }
            Err(e) => Err(CatalogError::Io(e)),
        }
    }

    /// [`remove`](Self::remove) for optional song fields.
    pub fn remove_optional(&self, category: AssetCategory, filename: Option<&str>) -> Result<()> {
        match filename {
            Some(name) => self.remove(category, name),
            None => Ok(()),
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
