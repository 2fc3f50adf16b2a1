//! Core data types
//!
//! Request descriptors, platform payload records, pagination cursors and
//! stream manifests shared by the transport, pagination and media layers.

mod cursor;
mod manifest;
mod record;
mod request;

pub use cursor::{Cursor, NO_MORE};
pub use manifest::{MediaTrack, StreamManifest};
pub use record::{CommentRecord, Page, VideoRecord};
pub use request::{HttpMethod, RequestDescriptor};
