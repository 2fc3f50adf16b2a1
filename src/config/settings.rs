//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the crawler.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration settings for the crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP transport configuration
    pub http: HttpSettings,
    /// Crawl pacing configuration
    pub crawler: CrawlerSettings,
    /// Media acquisition configuration
    pub media: MediaSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Crawl pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Pause between comment pages in milliseconds
    pub crawl_interval_ms: u64,
    /// Request reply-thread expansion (currently contributes no items)
    pub fetch_sub_comments: bool,
}

/// Media acquisition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Master switch for media acquisition; when false the pipeline is a no-op
    pub enable_download: bool,
    /// Root directory for downloaded media, one subdirectory per platform
    pub output_dir: PathBuf,
    /// Upper bound on concurrent segment downloads
    pub segment_concurrency: usize,
    /// Path or name of the external assembly tool
    pub ffmpeg_path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
        }
    }
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            crawl_interval_ms: 1000,
            fetch_sub_comments: false,
        }
    }
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            enable_download: false,
            output_dir: PathBuf::from("data"),
            segment_concurrency: 4,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            crawler: CrawlerSettings::default(),
            media: MediaSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Inter-page crawl pause as a [`Duration`]
    pub fn crawl_interval(&self) -> Duration {
        Duration::from_millis(self.crawler.crawl_interval_ms)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| crate::Error::config(format!("Invalid config file: {}", e)))
    }

    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    /// Override settings from environment variables
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(timeout) = std::env::var("CRAWLER_HTTP_TIMEOUT") {
            self.http.timeout_secs = timeout
                .parse()
                .map_err(|e| crate::Error::config(format!("Invalid timeout: {}", e)))?;
        }

        if let Ok(interval) = std::env::var("CRAWLER_INTERVAL_MS") {
            self.crawler.crawl_interval_ms = interval
                .parse()
                .map_err(|e| crate::Error::config(format!("Invalid interval: {}", e)))?;
        }

        if let Ok(enable) = std::env::var("ENABLE_MEDIA_DOWNLOAD") {
            self.media.enable_download = matches!(enable.as_str(), "1" | "true" | "yes");
        }

        if let Ok(dir) = std::env::var("MEDIA_OUTPUT_DIR") {
            self.media.output_dir = PathBuf::from(dir);
        }

        Ok(self)
    }

    /// Validate the final configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(crate::Error::config("timeout_secs must be non-zero"));
        }
        if self.media.segment_concurrency == 0 {
            return Err(crate::Error::config("segment_concurrency must be non-zero"));
        }
        Ok(())
    }
}
