//! Error handling for the crawler
//!
//! Provides the crate-wide error type and result alias.

mod types;

pub use types::{Error, Result};
