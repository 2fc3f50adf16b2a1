//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.
#![allow(dead_code)] // not every suite uses every helper

use async_trait::async_trait;
use media_crawler::config::Settings;
use media_crawler::media::{AssemblyJob, AssemblyKind, AssemblyRunner};
use media_crawler::sign::GraphqlTemplates;
use media_crawler::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Settings tuned for tests: fast pacing, downloads enabled, temp output dir
pub fn test_settings(output_dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.http.timeout_secs = 5;
    settings.crawler.crawl_interval_ms = 1;
    settings.media.enable_download = true;
    settings.media.output_dir = output_dir.to_path_buf();
    settings.media.segment_concurrency = 4;
    settings
}

/// Minimal GraphQL template registry covering every operation under test
pub fn test_templates() -> GraphqlTemplates {
    let mut templates = HashMap::new();
    for (key, operation) in [
        ("vision_profile", "visionProfileUserList"),
        ("search_query", "visionSearchPhoto"),
        ("video_detail", "visionVideoDetail"),
        ("comment_list", "commentListQuery"),
    ] {
        templates.insert(
            key.to_string(),
            format!("query {operation}($photoId: String) {{ ... }}"),
        );
    }
    GraphqlTemplates::new(templates)
}

/// Assembly runner that works on plain bytes instead of invoking ffmpeg
///
/// Mux and concat append the inputs in order, frame extraction writes a
/// fixed marker, so tests can assert on exact output bytes.
#[derive(Debug, Clone)]
pub struct FakeRunner;

#[async_trait]
impl AssemblyRunner for FakeRunner {
    async fn run(&self, job: &AssemblyJob) -> Result<()> {
        job.validate().await?;
        match job.kind {
            AssemblyKind::Mux | AssemblyKind::Concat => {
                let mut output = Vec::new();
                for input in &job.inputs {
                    output.extend(tokio::fs::read(input).await?);
                }
                tokio::fs::write(&job.output, output).await?;
            }
            AssemblyKind::ExtractFrame => {
                tokio::fs::write(&job.output, b"thumbnail").await?;
            }
        }
        Ok(())
    }
}

/// Assembly runner that always fails, for cleanup-path tests
#[derive(Debug, Clone)]
pub struct FailingRunner;

#[async_trait]
impl AssemblyRunner for FailingRunner {
    async fn run(&self, _job: &AssemblyJob) -> Result<()> {
        Err(Error::assembly("simulated tool failure"))
    }
}

/// Names of the regular files currently present in a directory
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
