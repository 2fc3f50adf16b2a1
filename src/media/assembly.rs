//! External assembly tool invocation
//!
//! All external-process concerns sit behind the [`AssemblyRunner`] trait so
//! the tool itself stays swappable; the default runner shells out to ffmpeg
//! with copy codecs (mux/concat) or single-frame extraction.

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Offset into the stream the thumbnail frame is taken from
const FRAME_OFFSET: &str = "00:00:05";

/// What the assembly tool is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyKind {
    /// Combine separate video and audio tracks into one container
    Mux,
    /// Concatenate ordered segments into one container
    Concat,
    /// Extract a single frame as a thumbnail image
    ExtractFrame,
}

/// One invocation of the external assembly tool
#[derive(Debug, Clone)]
pub struct AssemblyJob {
    /// Operation kind
    pub kind: AssemblyKind,
    /// Input file paths, in the order they must be consumed
    pub inputs: Vec<PathBuf>,
    /// Output file path
    pub output: PathBuf,
}

impl AssemblyJob {
    /// Mux a video track and an audio track into one container
    pub fn mux(video: impl Into<PathBuf>, audio: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            kind: AssemblyKind::Mux,
            inputs: vec![video.into(), audio.into()],
            output: output.into(),
        }
    }

    /// Concatenate segments, strictly in the given order
    pub fn concat(inputs: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            kind: AssemblyKind::Concat,
            inputs,
            output: output.into(),
        }
    }

    /// Extract the thumbnail frame from a finished media file
    pub fn extract_frame(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            kind: AssemblyKind::ExtractFrame,
            inputs: vec![input.into()],
            output: output.into(),
        }
    }

    /// Check that every input exists and is non-empty
    ///
    /// Runs before the tool is invoked so a missing or truncated input is
    /// reported as an assembly error instead of a cryptic tool failure.
    pub async fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::assembly("assembly job has no inputs"));
        }
        for input in &self.inputs {
            let meta = tokio::fs::metadata(input).await.map_err(|_| {
                Error::assembly(format!("missing assembly input: {}", input.display()))
            })?;
            if meta.len() == 0 {
                return Err(Error::assembly(format!(
                    "empty assembly input: {}",
                    input.display()
                )));
            }
        }
        Ok(())
    }
}

/// Executor for assembly jobs
#[async_trait]
pub trait AssemblyRunner: Send + Sync {
    /// Run one job to completion
    async fn run(&self, job: &AssemblyJob) -> Result<()>;
}

/// Default runner invoking the ffmpeg command-line tool
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Program name or path
    program: String,
}

impl FfmpegRunner {
    /// Create a runner for the given ffmpeg binary
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, job: &AssemblyJob) -> Command {
        let mut cmd = Command::new(&self.program);
        match job.kind {
            AssemblyKind::Mux => {
                cmd.arg("-i")
                    .arg(&job.inputs[0])
                    .arg("-i")
                    .arg(&job.inputs[1])
                    .args(["-acodec", "copy", "-vcodec", "copy", "-y"])
                    .arg(&job.output);
            }
            AssemblyKind::Concat => {
                cmd.arg("-i")
                    .arg(format!("concat:{}", join_paths(&job.inputs)))
                    .args(["-c", "copy", "-y"])
                    .arg(&job.output);
            }
            AssemblyKind::ExtractFrame => {
                cmd.arg("-i")
                    .arg(&job.inputs[0])
                    .args(["-ss", FRAME_OFFSET, "-f", "image2", "-frames:v", "1", "-q:v", "2", "-y"])
                    .arg(&job.output);
            }
        }
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

#[async_trait]
impl AssemblyRunner for FfmpegRunner {
    async fn run(&self, job: &AssemblyJob) -> Result<()> {
        job.validate().await?;

        tracing::debug!(kind = ?job.kind, output = %job.output.display(), "running assembly tool");
        let status = self
            .command(job)
            .status()
            .await
            .map_err(|e| Error::assembly(format!("failed to launch {}: {}", self.program, e)))?;

        if !status.success() {
            return Err(Error::assembly(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

/// Render the concat protocol input list
fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("|")
}

/// Best-effort removal of intermediate files, errors ignored
pub(crate) async fn discard_files<I>(paths: I)
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    for path in paths {
        let _ = tokio::fs::remove_file(path.as_ref()).await;
    }
}
