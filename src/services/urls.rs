//! URL helpers shared by the bookmark store and the library.

use url::Url;

use crate::types::errors::{StoreError, StoreResult};

/// Parses `raw` as an absolute URL that has a host.
pub fn parse_absolute(raw: &str) -> StoreResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation("url must not be empty"));
    }
    let url = Url::parse(trimmed)
        .map_err(|e| StoreError::validation(format!("invalid url '{}': {}", trimmed, e)))?;
    if !url.has_host() {
        return Err(StoreError::validation(format!(
            "url '{}' has no host",
            trimmed
        )));
    }
    Ok(url)
}

/// `origin + "/favicon.ico"`.
pub fn favicon_for(url: &Url) -> String {
    format!("{}/favicon.ico", url.origin().ascii_serialization())
}

/// Title fallback for a bookmark saved without one: the host, minus `www.`.
pub fn title_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
