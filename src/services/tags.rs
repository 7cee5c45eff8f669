//! Tag name normalization.
//!
//! Tags are stored as an ordered list of lower-cased, trimmed, unique names.
//! Delimited strings are only split when ingesting raw external input.

/// Trims and lower-cases a tag name. Returns `None` for blank input.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes every name, dropping blanks and later duplicates.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for name in raw {
        if let Some(tag) = normalize_tag(name.as_ref()) {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
    }
    out
}

/// Splits a comma-delimited tag string such as `"Rust, async,rust"`.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}
