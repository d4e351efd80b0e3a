/*!
 * Utility functions for davbrowse
 */

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Targets that are already absolute and must not get the base URI prepended
static ABSOLUTE_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(mailto:|/|https?:)").expect("absolute href pattern is valid")
});

/// Escape text for use in HTML element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Whether a link target is absolute (`mailto:`, `/`, `http:` or `https:`)
pub fn is_absolute_href(href: &str) -> bool {
    ABSOLUTE_HREF.is_match(href)
}

/// Split a path into its parent and last segment
///
/// Leading and trailing slashes are ignored, so `"a/b/"` gives `("a", "b")`
/// and a single segment has an empty parent.
pub fn split_path(path: &str) -> (&str, &str) {
    let trimmed = path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", trimmed),
    }
}

/// Keep only the last path segment of a user supplied name, trimmed
///
/// `.` and `..` are not names and come back empty.
pub fn basename(name: &str) -> &str {
    let is_separator = |c: char| c == '/' || c == '\\';
    let segment = name
        .trim()
        .trim_matches(is_separator)
        .rsplit(is_separator)
        .next()
        .unwrap_or_default()
        .trim();
    match segment {
        "." | ".." => "",
        _ => segment,
    }
}

/// Join a collection path and a child name
pub fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Percent-encode every segment of a path, keeping the separators
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Format a timestamp the way the index page shows it, e.g. `March 4, 2024, 1:05 pm`
pub fn format_long_date(time: &DateTime<Utc>) -> String {
    time.format("%B %-d, %Y, %-I:%M %P").to_string()
}
