//! Catalog operations as called by the CLI and the C ABI.
//!
//! Each operation is one load → mutate → save cycle over the document file.
//! Assets are copied before the document is touched, so a failed copy never
//! leaves a half-populated record behind (copies that already succeeded stay
//! on disk).
//!
//! Within one process the cycles are serialized by a mutex. Nothing guards
//! against a second process writing the same file; the later save wins.

use std::sync::{Mutex, MutexGuard};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::asset_manager::{AssetCategory, AssetManager, AssetSource};
use crate::catalog_config::CatalogConfig;
use crate::catalog_error::{CatalogError, Result};
use crate::catalog_model::{lenient, CatalogDocument, God, Language, Song};
use crate::catalog_store::CatalogStore;
use crate::id_generator::{generate_god_id, generate_song_id};

/// Prefix applied to every god's display name.
pub const GOD_NAME_PREFIX: &str = "Lord ";

/// Input for [`CatalogState::add_god`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGod {
    pub name: String,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub display_order: i64,

    #[serde(default)]
    pub image: Option<AssetSource>,
}

/// Input for [`CatalogState::add_song`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    pub title: String,

    pub god_id: String,

    #[serde(default, deserialize_with = "lenient::language")]
    pub language_default: Language,

    #[serde(default)]
    pub audio: Option<AssetSource>,

    #[serde(default)]
    pub lyrics_telugu: Option<AssetSource>,

    #[serde(default)]
    pub lyrics_english: Option<AssetSource>,

    /// Milliseconds.
    #[serde(default, deserialize_with = "lenient::non_negative_integer")]
    pub duration: u64,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub display_order: i64,
}

/// What [`CatalogState::add_god`] would produce for a name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GodPreview {
    pub id: String,
    pub name: String,
}

pub struct CatalogState {
    config: CatalogConfig,
    store: CatalogStore,
    assets: AssetManager,
    write_lock: Mutex<()>,
}

impl CatalogState {
    pub fn init(config: CatalogConfig) -> Self {
        info!(
            "Opening catalog {} with assets under {}",
            config.json_path.display(),
            config.assets_path.display()
        );
        Self {
            store: CatalogStore::new(&config.json_path),
            assets: AssetManager::new(&config.assets_path),
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    /// Points this state at new locations. The new config is validated first
    /// and left unapplied if it fails.
    pub fn reconfigure(&mut self, config: CatalogConfig) -> Result<()> {
        config.validate()?;
        *self = Self::init(config);
        Ok(())
    }

    /// Creates the document with an empty catalog if it does not exist yet.
    ///
    /// Returns `true` when a file was created. The parent directory must
    /// exist.
    pub fn init_document(&self) -> Result<bool> {
        let _guard = self.lock();
        if self.store.path().exists() {
            return Ok(false);
        }
        let mut document = CatalogDocument::empty();
        self.store.save(&mut document)?;
        info!("Created catalog document at {}", self.store.path().display());
        Ok(true)
    }

    /// The current document as stored on disk.
    pub fn document(&self) -> Result<CatalogDocument> {
        self.store.load()
    }

    pub fn add_god(&self, request: NewGod) -> Result<God> {
        let display_name = request.name.trim();
        if display_name.is_empty() {
            return Err(CatalogError::validation("God name is required"));
        }

        let _guard = self.lock();
        let mut document = self.store.load()?;
        let id = generate_god_id(display_name, &document.gods);

        let image_file_name = match &request.image {
            Some(source) => self.assets.store(source, AssetCategory::Images)?,
            None => String::new(),
        };

        let god = God {
            id,
            name: format!("{GOD_NAME_PREFIX}{display_name}"),
            image_file_name,
            display_order: request.display_order,
            songs: Vec::new(),
            extra: Map::new(),
        };

        document.insert_god(god.clone());
        self.store.save(&mut document)?;
        info!("God added: id={}, name={}", god.id, god.name);
        Ok(god)
    }

    pub fn add_song(&self, request: NewSong) -> Result<Song> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(CatalogError::validation("Song title is required"));
        }
        let god_id = request.god_id.trim();
        if god_id.is_empty() {
            return Err(CatalogError::validation("God ID is required"));
        }

        let _guard = self.lock();
        let mut document = self.store.load()?;
        if document.find_god(god_id).is_none() {
            return Err(CatalogError::not_found(format!("God '{god_id}'")));
        }

        let id = generate_song_id(god_id, &document.gods);
        let audio_file_name = self.store_optional(request.audio.as_ref(), AssetCategory::Audio)?;
        let lyrics_telugu_file_name =
            self.store_optional(request.lyrics_telugu.as_ref(), AssetCategory::LyricsTelugu)?;
        let lyrics_english_file_name =
            self.store_optional(request.lyrics_english.as_ref(), AssetCategory::LyricsEnglish)?;

        let song = Song {
            id,
            title: title.to_string(),
            god_id: god_id.to_string(),
            language_default: request.language_default,
            audio_file_name,
            lyrics_telugu_file_name,
            lyrics_english_file_name,
            duration: request.duration,
            display_order: request.display_order,
            extra: Map::new(),
        };

        document.insert_song(god_id, song.clone())?;
        self.store.save(&mut document)?;
        info!("Song added: id={}, title={}", song.id, song.title);
        Ok(song)
    }

    /// Deletes a god, every one of its songs and all of their asset files.
    ///
    /// Files are removed before the document is saved. If a removal fails the
    /// document is left as it was and the error is returned, so the caller
    /// can retry once the file problem is fixed.
    pub fn delete_god(&self, god_id: &str) -> Result<God> {
        let god_id = god_id.trim();
        let _guard = self.lock();
        let mut document = self.store.load()?;
        let god = document
            .find_god(god_id)
            .ok_or_else(|| CatalogError::not_found(format!("God '{god_id}'")))?;

        self.assets.remove(AssetCategory::Images, &god.image_file_name)?;
        for song in &god.songs {
            self.remove_song_assets(song)?;
        }

        let removed = document.delete_god(god_id)?;
        self.store.save(&mut document)?;
        info!(
            "God deleted: id={} with {} song(s)",
            removed.id,
            removed.songs.len()
        );
        Ok(removed)
    }

    pub fn delete_song(&self, song_id: &str) -> Result<Song> {
        let song_id = song_id.trim();
        let _guard = self.lock();
        let mut document = self.store.load()?;
        let song = document
            .find_song(song_id)
            .ok_or_else(|| CatalogError::not_found(format!("Song '{song_id}'")))?;

        self.remove_song_assets(song)?;

        let removed = document.delete_song(song_id)?;
        self.store.save(&mut document)?;
        info!("Song deleted: id={}", removed.id);
        Ok(removed)
    }

    /// The id and name [`add_god`](Self::add_god) would assign right now.
    ///
    /// An unreadable document counts as an empty catalog. A blank name yields
    /// empty strings.
    pub fn preview_god(&self, display_name: &str) -> GodPreview {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return GodPreview::default();
        }
        let document = self.load_for_preview();
        GodPreview {
            id: generate_god_id(display_name, &document.gods),
            name: format!("{GOD_NAME_PREFIX}{display_name}"),
        }
    }

    pub fn preview_god_id(&self, display_name: &str) -> String {
        self.preview_god(display_name).id
    }

    /// The id [`add_song`](Self::add_song) would assign under `god_id` right
    /// now, or an empty string for a blank god id.
    pub fn preview_song_id(&self, god_id: &str) -> String {
        let god_id = god_id.trim();
        if god_id.is_empty() {
            return String::new();
        }
        let document = self.load_for_preview();
        generate_song_id(god_id, &document.gods)
    }

    fn load_for_preview(&self) -> CatalogDocument {
        match self.store.load() {
            Ok(document) => document,
            Err(e) => {
                warn!("Preview using an empty catalog: {e}");
                CatalogDocument::empty()
            }
        }
    }

    fn store_optional(&self, source: Option<&AssetSource>, category: AssetCategory) -> Result<Option<String>> {
        source
            .map(|s| self.assets.store(s, category))
            .transpose()
    }

    fn remove_song_assets(&self, song: &Song) -> Result<()> {
        self.assets
            .remove_optional(AssetCategory::Audio, song.audio_file_name.as_deref())?;
        self.assets
            .remove_optional(AssetCategory::LyricsTelugu, song.lyrics_telugu_file_name.as_deref())?;
        self.assets
            .remove_optional(AssetCategory::LyricsEnglish, song.lyrics_english_file_name.as_deref())
    }

    // A panic in another operation cannot leave the unit guard inconsistent.
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

