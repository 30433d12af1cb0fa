//! Loading, mutating and persisting the catalog document.
//!
//! The store knows nothing about asset files. Every caller reads the whole
//! document, changes it in memory and writes it back; nothing is cached
//! between calls.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::catalog_error::{CatalogError, Result};
use crate::catalog_model::{CatalogDocument, God, Song};
use crate::path_utils::{current_version_stamp, is_version_stamp};

/// Handle on the JSON file holding the catalog.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the document.
    ///
    /// Empty content yields a fresh empty catalog. A missing `gods` array or
    /// `version` is filled in memory only; the file is not rewritten until the
    /// next save.
    pub fn load(&self) -> Result<CatalogDocument> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::DocumentNotFound(self.path.clone()));
            }
            Err(e) => return Err(CatalogError::Io(e)),
        };

        parse_document(&content)
    }

    /// Stamps `document` with the current version and overwrites the file.
    ///
    /// The new version never sorts before the previous one, even if the clock
    /// went backwards. The parent directory must already exist.
    pub fn save(&self, document: &mut CatalogDocument) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => return Err(CatalogError::DocumentNotFound(self.path.clone())),
        };
        if !parent.is_dir() {
            return Err(CatalogError::DocumentNotFound(self.path.clone()));
        }

        document.version = next_version(&document.version);

        let mut json = serde_json::to_string_pretty(document)
            .map_err(|e| CatalogError::MalformedDocument(format!("Could not serialize catalog: {e}")))?;
        json.push('\n');

        write_replacing(&self.path, json.as_bytes())?;
        info!("✅ Catalog saved with version {}", document.version);
        Ok(())
    }
}

/// Parses document text, applying the same repairs as [`CatalogStore::load`].
pub fn parse_document(content: &str) -> Result<CatalogDocument> {
    if content.trim().is_empty() {
        debug!("Catalog file is empty, starting a fresh document");
        return Ok(CatalogDocument::empty());
    }

    let mut document: CatalogDocument = serde_json::from_str(content)
        .map_err(|e| CatalogError::MalformedDocument(e.to_string()))?;

    if document.version.trim().is_empty() {
        warn!("Catalog document has no version, stamping it in memory");
        document.version = current_version_stamp();
    }

    Ok(document)
}

fn next_version(previous: &str) -> String {
    let now = current_version_stamp();
    if is_version_stamp(previous) && previous > now.as_str() {
        warn!("Clock is behind catalog version {previous}, keeping it");
        return previous.to_string();
    }
    now
}

// Writes next to the target and renames over it, so readers never see a
// half-written document.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(CatalogError::Io(e));
    }
    Ok(())
}

impl CatalogDocument {
    /// Appends `god` and re-sorts gods by display order.
    ///
    /// The sort is stable, so gods sharing a display order keep their
    /// relative order.
    pub fn insert_god(&mut self, god: God) {
        self.gods.push(god);
        self.gods.sort_by_key(|g| g.display_order);
    }

    /// Appends `song` to the god `god_id` and re-sorts that god's songs.
    pub fn insert_song(&mut self, god_id: &str, song: Song) -> Result<()> {
        let god = self
            .gods
            .iter_mut()
            .find(|g| g.id == god_id)
            .ok_or_else(|| CatalogError::not_found(format!("God '{god_id}'")))?;
        god.songs.push(song);
        god.songs.sort_by_key(|s| s.display_order);
        Ok(())
    }

    /// Removes and returns the god `god_id` together with its songs.
    pub fn delete_god(&mut self, god_id: &str) -> Result<God> {
        let index = self
            .gods
            .iter()
            .position(|g| g.id == god_id)
            .ok_or_else(|| CatalogError::not_found(format!("God '{god_id}'")))?;
        Ok(self.gods.remove(index))
    }

    /// Removes and returns the first song with id `song_id`, searching gods in
    /// document order.
    pub fn delete_song(&mut self, song_id: &str) -> Result<Song> {
        for god in &mut self.gods {
            if let Some(index) = god.songs.iter().position(|s| s.id == song_id) {
                return Ok(god.songs.remove(index));
            }
        }
        Err(CatalogError::not_found(format!("Song '{song_id}'")))
    }
}
