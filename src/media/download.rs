//! Raw byte fetching
//!
//! One download per call, no partial state: bytes land in a `.part` sibling
//! and are renamed into place only after the body arrived complete and
//! non-empty, so a failure never leaves a half-written file at the
//! destination.

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One byte-fetch with its destination
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// Source URL
    pub url: String,
    /// Destination path for the complete bytes
    pub dest: PathBuf,
    /// Request headers (session cookies, referer)
    pub headers: HashMap<String, String>,
}

impl DownloadTask {
    /// Create a task
    pub fn new(
        url: impl Into<String>,
        dest: impl Into<PathBuf>,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            headers,
        }
    }

    /// Fetch the bytes to the destination
    pub async fn fetch(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let mut request = client.get(&self.url);
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::download(&self.url, e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::download(&self.url, e.to_string()))?;

        if bytes.is_empty() {
            return Err(Error::download(&self.url, "empty response body"));
        }

        if let Some(parent) = self.dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = part_path(&self.dest);
        tokio::fs::write(&part, &bytes).await?;
        tokio::fs::rename(&part, &self.dest).await?;

        tracing::debug!(url = %self.url, dest = %self.dest.display(), size = bytes.len(), "download complete");
        Ok(())
    }
}

/// Fetch a small text body (playlist, watch page) with session headers
pub(crate) async fn fetch_text(
    url: &str,
    headers: &HashMap<String, String>,
    timeout: Duration,
) -> Result<String> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut request = client.get(url);
    for (name, value) in headers {
        request = request.header(name, value);
    }

    Ok(request.send().await?.text().await?)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
