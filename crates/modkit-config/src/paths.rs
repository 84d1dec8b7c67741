//! Lexical path canonicalization and base-relative resolution
//!
//! Module metadata carries paths that may not exist yet (install targets,
//! uncreated cache directories), so everything here works on the textual form
//! only. No symlinks are followed and the filesystem is never consulted.

use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

/// Canonicalize a path lexically.
///
/// Both `/` and `\` are accepted as separators and normalized to the platform
/// separator. `.` segments and empty segments (doubled separators) are
/// dropped, and `..` pops the previous segment. A `..` with nothing left to
/// pop is discarded, so traversal can never climb above a root prefix.
///
/// A leading separator or a drive-style first segment (one containing `:`)
/// is preserved as a prefix.
pub fn canonicalize(path: &str) -> String {
    let normalized = path.replace(['\\', '/'], MAIN_SEPARATOR_STR);

    let mut segments: Vec<&str> = normalized
        .split(MAIN_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut prefix = String::new();
    if normalized.starts_with(MAIN_SEPARATOR) {
        prefix.push(MAIN_SEPARATOR);
    } else if segments.first().is_some_and(|first| first.contains(':')) {
        prefix.push_str(segments.remove(0));
        prefix.push(MAIN_SEPARATOR);
    }

    let mut stack: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    format!("{}{}", prefix, stack.join(MAIN_SEPARATOR_STR))
}

/// Whether a path is absolute in the lexical sense: a leading `/` or `\`, or
/// a Windows drive prefix (`C:/` or `C:\`).
pub fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Resolve `path` against `base`: absolute inputs are canonicalized as-is,
/// relative inputs are joined onto the base first.
///
/// Resolution is lexical, so a relative path with enough `..` segments can
/// escape the base directory.
pub fn absolute_path(base: &str, path: &str) -> String {
    if is_absolute(path) {
        return canonicalize(path);
    }
    canonicalize(&format!("{}{}{}", base, MAIN_SEPARATOR, path))
}

/// Lexical parent of a path: everything before the last separator.
///
/// A path with no separator has no walkable parent and yields `.`, matching
/// the usual dirname contract.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind(MAIN_SEPARATOR) {
        Some(0) => MAIN_SEPARATOR_STR,
        Some(idx) => &path[..idx],
        None => ".",
    }
}
