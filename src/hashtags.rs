//! Hashtag extraction from post captions.

use regex::Regex;

static HASHTAG: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_]+)").expect("Invalid regex"));

/// Extract every hashtag in `caption`, lowercased and without the leading `#`.
///
/// Repeated tags are kept in order of appearance.
#[must_use]
pub fn extract_tags(caption: &str) -> Vec<String> {
    HASHTAG
        .captures_iter(caption)
        .map(|caps| caps[1].to_lowercase())
        .collect()
}

/// Normalize a user-supplied tag filter (`#Travel` -> `travel`).
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}
