//! Segmented playlist parsing
//!
//! A playlist body lists one segment URL per non-metadata line, in ascending
//! play order. Relative entries are resolved against the playlist URL.

use crate::Result;
use url::Url;

/// Derive the ordered absolute segment URLs from a playlist body
pub fn segment_urls(playlist_url: &str, body: &str) -> Result<Vec<String>> {
    let base = Url::parse(playlist_url)?;

    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| Ok(base.join(line)?.to_string()))
        .collect()
}
