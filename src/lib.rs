//! # Divine Catalog Core
//!
//! Local storage for the gods-and-songs catalog read by the Divine Blessing
//! mobile application. The catalog is a single pretty-printed JSON document;
//! the media it references (god images, song audio, Telugu and English
//! lyrics) live in a folder tree next to it.
//!
//! ## Features
//!
//! - **Plain JSON datastore**: the whole document is read, changed and
//!   written back on every operation, stamped with a `YYYYMMDDHHMMSS` version
//! - **Readable IDs**: `god_shiva`, `song_shiva_20241008153045`, with
//!   collision suffixes checked against the current catalog
//! - **Asset lifecycle**: files are copied in before a record is added and
//!   removed when the record is deleted
//! - **FFI-friendly**: JSON in, JSON out through C-compatible functions
//! - **Safe error handling**: No `unwrap()` calls in production code
//!
//! ## Quick Start
//!
//! ```no_run
//! use divine_catalog_core::catalog_config::CatalogConfig;
//! use divine_catalog_core::catalog_state::{CatalogState, NewGod};
//!
//! let state = CatalogState::init(CatalogConfig::new("assets/gods_songs.json", "assets"));
//! let god = state.add_god(NewGod { name: "Shiva".into(), display_order: 1, image: None })?;
//! assert_eq!(god.id, "god_shiva");
//! # Ok::<(), divine_catalog_core::catalog_error::CatalogError>(())
//! ```
//!
//! ## FFI Functions
//!
//! - [`open_catalog`] - Create a catalog handle for a document and assets root
//! - [`get_catalog`] - Read the whole document
//! - [`add_god`] / [`add_song`] - Insert records, copying their assets
//! - [`delete_god`] / [`delete_song`] - Remove records and their assets
//! - [`preview_god`] / [`preview_song`] - Show the IDs that would be assigned
//! - [`close_catalog`] - Release a handle
//! - [`free_response`] - Release a string returned by any of the above

pub mod asset_manager;
pub mod catalog_config;
pub mod catalog_error;
pub mod catalog_model;
pub mod catalog_state;
pub mod catalog_store;
pub mod id_generator;
pub mod path_utils;
pub mod app_response;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::catalog_config::{CatalogConfig, ConfigOverrides};
use crate::catalog_state::{CatalogState, NewGod, NewSong};

/// Opens a catalog handle.
///
/// Both arguments may be null or empty, in which case the environment and
/// then the `./assets` defaults are used. The configuration is validated: the
/// document must exist and contain JSON, and the assets directory must exist.
///
/// # Returns
///
/// A pointer to a [`CatalogState`], or null if the configuration is invalid.
/// Release it with [`close_catalog`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use divine_catalog_core::open_catalog;
///
/// let json = CString::new("/data/assets/gods_songs.json").unwrap();
/// let assets = CString::new("/data/assets").unwrap();
/// let state = open_catalog(json.as_ptr(), assets.as_ptr());
/// assert!(!state.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn open_catalog(json_path: *const c_char, assets_path: *const c_char) -> *mut CatalogState {
    let explicit = ConfigOverrides {
        json_path: optional_c_str(json_path),
        assets_path: optional_c_str(assets_path),
    };

    let config = match CatalogConfig::load(explicit, None) {
        Ok(config) => config,
        Err(e) => {
            warn!("❌ Could not resolve catalog configuration: {e}");
            return std::ptr::null_mut();
        }
    };

    if let Err(e) = config.validate() {
        warn!("❌ Catalog configuration rejected: {e}");
        return std::ptr::null_mut();
    }

    info!("✅ Catalog opened at {}", config.json_path.display());
    Box::into_raw(Box::new(CatalogState::init(config)))
}

/// Returns the whole catalog document as the `Ok` payload.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_catalog(state: *mut CatalogState) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("get_catalog"),
    };

    response_to_c_string(&AppResponse::from(state.document()))
}

/// Adds a god.
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "Shiva",
///   "displayOrder": 1,
///   "image": { "path": "/tmp/uploads/shiva.png", "keepSource": false }
/// }
/// ```
///
/// The `Ok` payload is the stored god, including its generated `id`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_god(state: *mut CatalogState, json_ptr: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("add_god"),
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let request: NewGod = match serde_json::from_str(&json_str) {
        Ok(r) => r,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    response_to_c_string(&AppResponse::from(state.add_god(request)))
}

/// Adds a song under an existing god.
///
/// # JSON Format
///
/// ```json
/// {
///   "title": "Om Namah Shivaya",
///   "godId": "god_shiva",
///   "languageDefault": "telugu",
///   "audio": { "path": "/tmp/uploads/om.mp3" },
///   "lyricsTelugu": { "path": "/tmp/uploads/om_te.lrc" },
///   "lyricsEnglish": null,
///   "duration": 180000,
///   "displayOrder": 1
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_song(state: *mut CatalogState, json_ptr: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("add_song"),
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let request: NewSong = match serde_json::from_str(&json_str) {
        Ok(r) => r,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    response_to_c_string(&AppResponse::from(state.add_song(request)))
}

/// Deletes a god, its songs and every asset file they reference.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_god(state: *mut CatalogState, id: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("delete_god"),
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match state.delete_god(&id_str) {
        Ok(god) => {
            let success = AppResponse::success(format!(
                "God '{}' and {} song(s) deleted successfully",
                god.id,
                god.songs.len()
            ));
            response_to_c_string(&success)
        }
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Deletes a song and its asset files.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_song(state: *mut CatalogState, id: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("delete_song"),
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match state.delete_song(&id_str) {
        Ok(song) => {
            let success = AppResponse::success(format!("Song '{}' deleted successfully", song.id));
            response_to_c_string(&success)
        }
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Returns `{"id": ..., "name": ...}` that adding a god named `name` would produce.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn preview_god(state: *mut CatalogState, name: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("preview_god"),
    };

    let name_str = match c_ptr_to_string(name, "name") {
        Ok(name) => name,
        Err(err) => return err,
    };

    response_to_c_string(&AppResponse::json(&state.preview_god(&name_str)))
}

/// Returns the song id that adding a song under `god_id` would produce.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn preview_song(state: *mut CatalogState, god_id: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("preview_song"),
    };

    let god_id_str = match c_ptr_to_string(god_id, "god id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    response_to_c_string(&AppResponse::success(state.preview_song_id(&god_id_str)))
}

/// Releases a handle returned by [`open_catalog`]. Null is ignored.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_catalog(state: *mut CatalogState) {
    if state.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(state) });
    info!("Catalog handle closed");
}

/// Releases a string returned by any function of this library. Null is ignored.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn null_state(function: &str) -> *const c_char {
    let error = AppResponse::BadRequest(format!("Null state pointer passed to {function}"));
    response_to_c_string(&error)
}

/// Serializes `response` to JSON and hands ownership of the C string to the caller.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a `String`, or an error response ready to
/// return to the caller.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn optional_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Some(s.to_string()),
        Err(e) => {
            warn!("Ignoring non UTF-8 path argument: {e}");
            None
        }
    }
}
