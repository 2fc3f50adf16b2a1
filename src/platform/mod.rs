//! Platform clients
//!
//! One client per supported platform, wiring transport, session state,
//! request signing, pagination and the media pipeline together.

pub mod bilibili;
pub mod kuaishou;

pub use bilibili::{BilibiliClient, BilibiliClientGeneric, CommentOrderType, SearchOrderType};
pub use kuaishou::{KuaishouClient, KuaishouClientGeneric};
