//! Version stamps and operator-supplied path cleanup.

use std::path::{Component, Path, PathBuf};

use chrono::Local;

/// Length of a `YYYYMMDDHHMMSS` stamp.
pub const VERSION_STAMP_LEN: usize = 14;

/// Formats the local wall-clock time as `YYYYMMDDHHMMSS`.
///
/// Stamps sort lexicographically in time order, which is what the catalog
/// relies on when it keeps `version` non-decreasing.
pub fn current_version_stamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// Returns `true` when `value` has the shape of a version stamp (14 ASCII digits).
pub fn is_version_stamp(value: &str) -> bool {
    value.len() == VERSION_STAMP_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

/// Cleans up a path typed or pasted by an operator.
///
/// Surrounding whitespace is trimmed, a single layer of matching quotes is
/// stripped, `.`/`..` and repeated separators are collapsed and relative paths
/// are resolved against the current working directory. Returns `None` for an
/// empty candidate so the caller can substitute its default.
pub fn normalize_path(candidate: &str) -> Option<PathBuf> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return None;
    }

    let unquoted = strip_matching_quotes(trimmed).trim();
    if unquoted.is_empty() {
        return None;
    }

    let path = Path::new(unquoted);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(e) => {
                log::warn!("Could not read working directory, keeping relative path: {e}");
                path.to_path_buf()
            }
        }
    };

    Some(lexical_normalize(&absolute))
}

fn strip_matching_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

// Does not touch the filesystem, so symlinks are not resolved.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    _ => false,
                };
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
