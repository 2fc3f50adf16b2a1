//! Media acquisition pipeline
//!
//! Given an item's stream manifest, decides a download strategy, fetches the
//! raw bytes and assembles a single playable file plus a thumbnail. Every
//! failure is contained to the item being processed: it is logged, the
//! item's artifacts are cleaned up, and the crawling flow continues.

use crate::config::MediaSettings;
use crate::media::assembly::{AssemblyJob, AssemblyRunner, FfmpegRunner, discard_files};
use crate::media::download::{DownloadTask, fetch_text};
use crate::media::playlist::segment_urls;
use crate::types::{MediaTrack, StreamManifest};
use crate::{Error, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Acquisition pipeline for one platform's media
#[derive(Debug, Clone)]
pub struct MediaPipeline<R: AssemblyRunner = FfmpegRunner> {
    /// Media configuration, including the master download switch
    settings: MediaSettings,
    /// Per-request timeout
    timeout: Duration,
    /// Assembly tool executor
    runner: R,
}

impl MediaPipeline<FfmpegRunner> {
    /// Create a pipeline with the default ffmpeg runner
    pub fn new(settings: MediaSettings, timeout: Duration) -> Self {
        let runner = FfmpegRunner::new(settings.ffmpeg_path.clone());
        Self {
            settings,
            timeout,
            runner,
        }
    }
}

impl<R: AssemblyRunner> MediaPipeline<R> {
    /// Create a pipeline with a custom assembly runner
    pub fn with_runner(settings: MediaSettings, timeout: Duration, runner: R) -> Self {
        Self {
            settings,
            timeout,
            runner,
        }
    }

    /// Whether media acquisition is enabled at all
    pub fn enabled(&self) -> bool {
        self.settings.enable_download
    }

    /// Acquire the media and thumbnail for one item
    ///
    /// When acquisition is disabled this is a logged no-op: no network
    /// requests, no file writes. All failures are logged and contained; the
    /// canonical output path never holds a partial file afterwards.
    pub async fn acquire(
        &self,
        platform: &str,
        item_id: &str,
        manifest: &StreamManifest,
        headers: &HashMap<String, String>,
    ) {
        if !self.enabled() {
            tracing::info!(platform, item_id, "media download not enabled, skipping");
            return;
        }

        let dir = self.settings.output_dir.join(platform);
        let canonical = match self.fetch_media(&dir, item_id, manifest, headers).await {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(platform, item_id, error = %err, "media acquisition failed");
                discard_artifacts(&dir, item_id).await;
                return;
            }
        };

        let thumbnail = canonical.with_extension("jpeg");
        if let Err(err) = self
            .runner
            .run(&AssemblyJob::extract_frame(&canonical, &thumbnail))
            .await
        {
            tracing::warn!(platform, item_id, error = %err, "thumbnail extraction failed");
            discard_files([&thumbnail]).await;
            return;
        }

        tracing::info!(platform, item_id, path = %canonical.display(), "media acquired");
    }

    /// Run the download strategy and return the canonical media path
    async fn fetch_media(
        &self,
        dir: &Path,
        item_id: &str,
        manifest: &StreamManifest,
        headers: &HashMap<String, String>,
    ) -> Result<PathBuf> {
        match manifest {
            StreamManifest::Dash { video, audio } => {
                self.fetch_dash(dir, item_id, video, audio, headers).await
            }
            StreamManifest::Legacy { url } => self.fetch_legacy(dir, item_id, url, headers).await,
            StreamManifest::SegmentedPlaylist { url } => {
                self.fetch_segments(dir, item_id, url, headers).await
            }
        }
    }

    /// Separate adaptive tracks: best video, optional best audio, mux
    async fn fetch_dash(
        &self,
        dir: &Path,
        item_id: &str,
        video: &[MediaTrack],
        audio: &[MediaTrack],
        headers: &HashMap<String, String>,
    ) -> Result<PathBuf> {
        let video_track = video
            .first()
            .ok_or_else(|| Error::internal("dash manifest without video tracks"))?;
        let canonical = dir.join(format!("{item_id}.mp4"));
        let video_tmp = dir.join(format!("{item_id}.video.m4s"));

        DownloadTask::new(&video_track.base_url, &video_tmp, headers.clone())
            .fetch(self.timeout)
            .await?;

        match audio.first() {
            Some(audio_track) => {
                let audio_tmp = dir.join(format!("{item_id}.audio.m4s"));
                DownloadTask::new(&audio_track.base_url, &audio_tmp, headers.clone())
                    .fetch(self.timeout)
                    .await?;

                let muxed = dir.join(format!("{item_id}.mux.mp4"));
                self.runner
                    .run(&AssemblyJob::mux(&video_tmp, &audio_tmp, &muxed))
                    .await?;
                discard_files([&video_tmp, &audio_tmp]).await;
                tokio::fs::rename(&muxed, &canonical).await?;
            }
            None => {
                // Video-only item, the track already is the container
                tokio::fs::rename(&video_tmp, &canonical).await?;
            }
        }
        Ok(canonical)
    }

    /// Single legacy container, fetched directly to the canonical path
    async fn fetch_legacy(
        &self,
        dir: &Path,
        item_id: &str,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<PathBuf> {
        let canonical = dir.join(format!("{item_id}.{}", container_ext(url)));
        DownloadTask::new(url, &canonical, headers.clone())
            .fetch(self.timeout)
            .await?;
        Ok(canonical)
    }

    /// Segmented playlist: bounded-concurrency downloads, ordered concat
    async fn fetch_segments(
        &self,
        dir: &Path,
        item_id: &str,
        playlist_url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<PathBuf> {
        let body = fetch_text(playlist_url, headers, self.timeout).await?;
        let urls = segment_urls(playlist_url, &body)?;
        if urls.is_empty() {
            return Err(Error::download(playlist_url, "playlist lists no segments"));
        }

        // Indexed destination per segment; completion order is free, but the
        // concat below consumes strictly by segment index.
        let seg_paths: Vec<PathBuf> = (0..urls.len())
            .map(|i| dir.join(format!("{item_id}.{i}.ts")))
            .collect();

        let timeout = self.timeout;
        stream::iter(
            urls.iter()
                .zip(&seg_paths)
                .map(|(url, path)| DownloadTask::new(url, path, headers.clone())),
        )
        .map(|task| async move { task.fetch(timeout).await })
        .buffer_unordered(self.settings.segment_concurrency)
        .try_collect::<Vec<()>>()
        .await?;

        let canonical = dir.join(format!("{item_id}.mp4"));
        self.runner
            .run(&AssemblyJob::concat(seg_paths.clone(), &canonical))
            .await?;
        discard_files(&seg_paths).await;
        Ok(canonical)
    }
}

/// Container extension from a source URL, defaulting to mp4
fn container_ext(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path()
                .rsplit('/')
                .next()
                .and_then(|name| name.rsplit_once('.'))
                .map(|(_, ext)| ext.to_ascii_lowercase())
        })
        .filter(|ext| !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "mp4".to_string())
}

/// Remove every on-disk artifact belonging to one failed item
async fn discard_artifacts(dir: &Path, item_id: &str) {
    let prefix = format!("{item_id}.");
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry
            .file_name()
            .to_string_lossy()
            .starts_with(&prefix)
        {
            let _ = tokio::fs::remove_file(entry.path()).await;
        }
    }
}
