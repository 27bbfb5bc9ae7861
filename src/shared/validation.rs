use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters that are not safe inside a single storage key segment
    /// - Kept: letters, digits, dot, underscore, hyphen, space
    /// - Replaced: "/", "\\", "?", "#", control characters, etc.
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._\- ]").unwrap();
}

/// Make a user-supplied file name safe to embed in a storage key
///
/// Empty results fall back to "file" so that keys never end in a bare separator.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base.trim(), "_");
    if cleaned.trim_matches(['.', ' ']).is_empty() {
        "file".to_string()
    } else {
        cleaned.into_owned()
    }
}
