//! Media Crawler - platform API clients and media acquisition
//!
//! Session-authenticated clients for video platforms (Bilibili and Kuaishou)
//! that fetch content metadata and full comment histories through the
//! platforms' web APIs, and optionally acquire the underlying media files.
//!
//! # Architecture
//!
//! The crate is layered bottom-up:
//! - **Transport**: executes one HTTP request and maps the platform's
//!   success marker to a typed result
//! - **Session**: holds header/cookie state harvested from an external
//!   session provider
//! - **Signing**: WBI query signing (Bilibili) and GraphQL template
//!   resolution (Kuaishou)
//! - **Pagination**: cursor-driven aggregation of full comment histories
//! - **Media**: manifest resolution, segment/track download and ffmpeg
//!   assembly into a single playable file
//!
//! Browser automation, persistence and CLI concerns live outside this crate;
//! callers inject a [`SessionProvider`] for cookie harvesting and consume
//! pages through a [`PageSink`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use media_crawler::{BilibiliClient, Settings};
//!
//! # async fn example() -> media_crawler::Result<()> {
//! let settings = Settings::default();
//! let client = BilibiliClient::new(settings);
//! let comments = client.get_video_all_comments("170001", None, false).await?;
//! println!("fetched {} comments", comments.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod media;
pub mod pagination;
pub mod platform;
pub mod session;
pub mod sign;
pub mod transport;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use error::{Error, Result};
pub use pagination::PageSink;
pub use platform::{BilibiliClient, KuaishouClient};
pub use session::{SessionManager, SessionProvider};
pub use types::{CommentRecord, Cursor, Page, RequestDescriptor, StreamManifest, VideoRecord};
