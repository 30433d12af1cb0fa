//! Human-readable identifiers for new gods and songs.
//!
//! There is no persisted counter. Uniqueness is checked against the snapshot
//! of the document handed in, in three phases:
//!
//! 1. a deterministic base candidate derived from the name (or god id),
//! 2. up to [`MAX_SUFFIX_ATTEMPTS`] candidates `base_<n>` with `n` in `1..=999`,
//! 3. `base_<epoch millis>`, returned without checking.
//!
//! The IDs are read by the mobile application, so the shapes above must not
//! change.

use std::collections::HashSet;

use chrono::Utc;
use rand::Rng;

use crate::catalog_model::God;
use crate::path_utils::current_version_stamp;

pub const GOD_ID_PREFIX: &str = "god_";
pub const SONG_ID_PREFIX: &str = "song_";

/// Random suffixes tried before falling back to a timestamp suffix.
pub const MAX_SUFFIX_ATTEMPTS: usize = 100;

const MAX_RANDOM_SUFFIX: u32 = 999;

/// Lowercases `name` and collapses every whitespace run into one underscore.
///
/// Leading or trailing whitespace also turns into an underscore, so callers
/// trim operator input first.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('_');
            }
            in_whitespace = true;
        } else {
            slug.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }
    slug
}

/// Generates a god id such as `god_shiva` that is not used by `existing_gods`.
pub fn generate_god_id(display_name: &str, existing_gods: &[God]) -> String {
    generate_god_id_with(&mut rand::thread_rng(), display_name, existing_gods)
}

pub fn generate_god_id_with<R: Rng + ?Sized>(
    rng: &mut R,
    display_name: &str,
    existing_gods: &[God],
) -> String {
    let base = format!("{GOD_ID_PREFIX}{}", slugify(display_name));
    let taken: HashSet<&str> = existing_gods.iter().map(|g| g.id.as_str()).collect();
    resolve_collision(rng, base, &taken)
}

/// Generates a song id such as `song_shiva_20241008153045`.
///
/// Song ids are unique across the whole catalog, so every song of every god is
/// checked, not only the songs of `god_id`.
pub fn generate_song_id(god_id: &str, existing_gods: &[God]) -> String {
    generate_song_id_with(
        &mut rand::thread_rng(),
        god_id,
        &current_version_stamp(),
        existing_gods,
    )
}

pub fn generate_song_id_with<R: Rng + ?Sized>(
    rng: &mut R,
    god_id: &str,
    version_stamp: &str,
    existing_gods: &[God],
) -> String {
    let god_slug = god_id.replacen(GOD_ID_PREFIX, "", 1);
    let base = format!("{SONG_ID_PREFIX}{god_slug}_{version_stamp}");
    let taken: HashSet<&str> = existing_gods
        .iter()
        .flat_map(|g| g.songs.iter())
        .map(|s| s.id.as_str())
        .collect();
    resolve_collision(rng, base, &taken)
}

fn resolve_collision<R: Rng + ?Sized>(rng: &mut R, base: String, taken: &HashSet<&str>) -> String {
    if !taken.contains(base.as_str()) {
        return base;
    }

    for _ in 0..MAX_SUFFIX_ATTEMPTS {
        let suffix = rng.gen_range(1..=MAX_RANDOM_SUFFIX);
        let candidate = format!("{base}_{suffix}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
    }

    log::warn!("No free random suffix for '{base}' after {MAX_SUFFIX_ATTEMPTS} attempts, using timestamp");
    format!("{base}_{}", Utc::now().timestamp_millis())
}
