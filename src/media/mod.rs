//! Media acquisition
//!
//! Turns a stream manifest into a single playable file: raw byte fetches
//! (direct, per-track or per-segment), external remux/concat/thumbnail
//! invocations, and the decision policy tying them together. Failures here
//! are contained per item and never interrupt the crawling flow.

mod assembly;
mod download;
mod pipeline;
mod playlist;

pub use assembly::{AssemblyJob, AssemblyKind, AssemblyRunner, FfmpegRunner};
pub use download::DownloadTask;
pub use pipeline::MediaPipeline;
pub use playlist::segment_urls;
