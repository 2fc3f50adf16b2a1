//! Utility functions and helpers
//!
//! This module contains utility functions used throughout the application.

mod logging;

pub use logging::init_logging;
