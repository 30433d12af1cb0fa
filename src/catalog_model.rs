//! Records persisted in the catalog document.
//!
//! The document is consumed by a mobile application, so the serialized shape
//! (camelCase keys, field order, `null` for absent lyrics) is part of the
//! external contract:
//!
//! ```json
//! {
//!   "version": "20241008153045",
//!   "gods": [
//!     {
//!       "id": "god_shiva",
//!       "name": "Lord Shiva",
//!       "imageFileName": "shiva.png",
//!       "displayOrder": 1,
//!       "songs": [
//!         {
//!           "id": "song_shiva_20241008153045",
//!           "title": "Om Namah Shivaya",
//!           "godId": "god_shiva",
//!           "languageDefault": "telugu",
//!           "audioFileName": "om_namah_shivaya.mp3",
//!           "lyricsTeluguFileName": "om_namah_shivaya_te.lrc",
//!           "lyricsEnglishFileName": null,
//!           "duration": 180000,
//!           "displayOrder": 1
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Older files written by hand or by earlier tool versions are accepted as
//! long as they are JSON objects: numeric fields that are missing or not
//! numbers default to `0`, a missing `gods` array becomes empty and keys this
//! crate does not know about are carried through untouched.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::catalog_error::CatalogError;
use crate::path_utils::current_version_stamp;

/// Root object of the catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default = "current_version_stamp", deserialize_with = "lenient::version")]
    pub version: String,

    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub gods: Vec<God>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl CatalogDocument {
    /// An empty catalog stamped with the current time.
    pub fn empty() -> Self {
        Self {
            version: current_version_stamp(),
            gods: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn find_god(&self, god_id: &str) -> Option<&God> {
        self.gods.iter().find(|g| g.id == god_id)
    }

    /// Looks a song up across every god, in document order.
    pub fn find_song(&self, song_id: &str) -> Option<&Song> {
        self.songs().find(|s| s.id == song_id)
    }

    /// Every song of every god, flattened in document order.
    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.gods.iter().flat_map(|g| g.songs.iter())
    }
}

impl Default for CatalogDocument {
    fn default() -> Self {
        Self::empty()
    }
}

/// Top-level catalog entry owning zero or more songs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct God {
    pub id: String,

    pub name: String,

    /// Base filename inside `images/`, empty when the god has no picture.
    #[serde(default, deserialize_with = "lenient::string_or_default")]
    pub image_file_name: String,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub display_order: i64,

    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub songs: Vec<Song>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// A song belonging to exactly one god.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,

    pub title: String,

    pub god_id: String,

    #[serde(default, deserialize_with = "lenient::language")]
    pub language_default: Language,

    #[serde(default)]
    pub audio_file_name: Option<String>,

    #[serde(default)]
    pub lyrics_telugu_file_name: Option<String>,

    #[serde(default)]
    pub lyrics_english_file_name: Option<String>,

    /// Length in milliseconds.
    #[serde(default, deserialize_with = "lenient::non_negative_integer")]
    pub duration: u64,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub display_order: i64,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Language the mobile app shows lyrics in by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Telugu,
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Telugu => "telugu",
            Language::English => "english",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "telugu" => Ok(Language::Telugu),
            "english" => Ok(Language::English),
            other => Err(CatalogError::validation(format!(
                "Unknown default language '{other}', expected 'telugu' or 'english'"
            ))),
        }
    }
}

/// Tolerant field decoders for hand-edited or legacy documents.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as JsonValue;

    use super::Language;

    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Strings pass through, `null` becomes the type default; anything else is rejected.
    pub fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        null_as_default(deserializer)
    }

    /// Version stamps written as JSON numbers are read as their digits.
    /// Anything that is neither a string nor a number reads as blank, which
    /// the loader then re-stamps.
    pub fn version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::String(s) => s,
            JsonValue::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    /// Case-insensitive language name; `null`, blank or unknown values read as Telugu.
    pub fn language<'de, D>(deserializer: D) -> Result<Language, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::String(s) => s.parse().unwrap_or_else(|e| {
                log::warn!("Defaulting song language to telugu: {e}");
                Language::default()
            }),
            _ => Language::default(),
        })
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(integer_from_value(&JsonValue::deserialize(deserializer)?))
    }

    pub fn non_negative_integer<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(u64::try_from(integer(deserializer)?).unwrap_or(0))
    }

    /// Integer reading of a loosely typed value, `0` when it is not numeric.
    ///
    /// Fractions are truncated and numeric strings are parsed, which matches
    /// how the values used to be produced by the web form.
    pub fn integer_from_value(value: &JsonValue) -> i64 {
        match value {
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .unwrap_or(0),
            JsonValue::String(s) => parse_integer_prefix(s),
            _ => 0,
        }
    }

    /// Parses the leading integer of `s` (after whitespace), `0` if there is none.
    pub fn parse_integer_prefix(s: &str) -> i64 {
        let s = s.trim_start();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let end = digits
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(digits.len());
        match digits[..end].parse::<i64>() {
            Ok(n) if negative => -n,
            Ok(n) => n,
            Err(_) => 0,
        }
    }
}
