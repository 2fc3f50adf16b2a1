//! Pagination cursor
//!
//! Opaque continuation state for full-history comment fetching. A cursor is
//! only ever advanced from a server response; the aggregator never derives
//! the next value itself.

use serde::{Deserialize, Serialize};

/// Token value the template-signer platform returns when no pages remain
pub const NO_MORE: &str = "no_more";

/// Pagination state, advanced exclusively by server responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    /// Integer offset plus an explicit end flag (Bilibili reply cursor)
    Offset {
        /// Offset of the next page
        next: i64,
        /// Server-reported end flag
        is_end: bool,
    },
    /// Opaque continuation token with a "no more" sentinel (Kuaishou pcursor)
    Token {
        /// Continuation token, [`NO_MORE`] when exhausted
        pcursor: String,
    },
}

impl Cursor {
    /// Starting cursor for the offset scheme
    pub fn offset_start() -> Self {
        Self::Offset {
            next: 0,
            is_end: false,
        }
    }

    /// Starting cursor for the token scheme
    pub fn token_start() -> Self {
        Self::Token {
            pcursor: String::new(),
        }
    }

    /// Whether the server has signalled the end of pagination
    pub fn is_end(&self) -> bool {
        match self {
            Self::Offset { is_end, .. } => *is_end,
            Self::Token { pcursor } => pcursor == NO_MORE,
        }
    }
}
