//! Request signing
//!
//! Per-platform signing capabilities: the WBI keyed signer computes a
//! cryptographic query signature from two rotating keys, the GraphQL
//! template resolver attaches a registry-resolved query body, and the null
//! signer passes parameters through unchanged for unsigned read endpoints.

mod graphql;
mod wbi;

pub use graphql::GraphqlTemplates;
pub use wbi::{SigningKeys, WbiSigner};

use crate::Result;

/// Signing strategy applied to one request's query parameters
#[derive(Debug, Clone, Copy)]
pub enum Signer<'a> {
    /// WBI keyed signing
    Keyed(&'a WbiSigner),
    /// Pass parameters through unchanged
    Null,
}

impl Signer<'_> {
    /// Sign the parameters per the selected strategy
    pub fn sign(&self, params: Vec<(String, String)>) -> Result<Vec<(String, String)>> {
        match self {
            Self::Keyed(signer) => Ok(signer.sign(params)),
            Self::Null => Ok(params),
        }
    }
}
