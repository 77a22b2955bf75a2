//! Deep-link fragment handling.
//!
//! Browsers never send `#fragment` to the server, so a deep link such as
//! `/devices.php#device-123` survives the login round trip only if it was
//! encoded into `next`, or if the login page copies `location.hash` into the
//! hidden `url_hash` field before submitting.

use super::redirect::SafePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFragment {
    /// Everything before the first `#`.
    pub path: String,
    /// `""`, or `#` followed by at least one character.
    pub fragment: String,
}

/// Split on the first literal `#`.
#[must_use]
pub fn split_fragment(path: &str) -> PathFragment {
    match path.split_once('#') {
        Some((head, tail)) if !tail.is_empty() => PathFragment {
            path: head.to_string(),
            fragment: format!("#{tail}"),
        },
        Some((head, _)) => PathFragment {
            path: head.to_string(),
            fragment: String::new(),
        },
        None => PathFragment {
            path: path.to_string(),
            fragment: String::new(),
        },
    }
}

const fn is_hash_char(c: char) -> bool {
    c == '#' || c == '_' || c == '-' || c.is_ascii_alphanumeric()
}

/// Strip a client supplied hash down to `[#a-zA-Z0-9_-]`.
///
/// Returns `None` unless the stripped value still starts with `#`.
#[must_use]
pub fn sanitize_posted_hash(raw: &str) -> Option<String> {
    let sanitized: String = raw.chars().filter(|c| is_hash_char(*c)).collect();
    sanitized.starts_with('#').then_some(sanitized)
}

/// Build the final redirect target.
///
/// A fragment embedded in `next` always wins over the posted `url_hash`.
#[must_use]
pub fn resolve(safe: &SafePath, posted_hash: Option<&str>) -> String {
    let PathFragment { path, fragment } = split_fragment(safe.as_str());
    if !fragment.is_empty() {
        return format!("{path}{fragment}");
    }

    match posted_hash.and_then(sanitize_posted_hash) {
        Some(hash) => format!("{path}{hash}"),
        None => path,
    }
}
