//! WBI keyed query signing
//!
//! Computes the `w_rid` authentication token from two rotating server-issued
//! keys: a mixin key is derived from the key pair through a fixed index
//! table, the query is canonicalized (key-sorted, reserved characters
//! stripped from values, `wts` timestamp appended) and the MD5 digest of
//! query-plus-mixin-key is appended as the `w_rid` parameter.
//!
//! Signing is a pure function of (keys, parameters, timestamp); identical
//! inputs always produce the identical signed query.

use md5::{Digest, Md5};
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Index table the mixin key is assembled through
const MIXIN_KEY_ENC_TAB: [usize; 64] = [
    46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49, 33, 9, 42, 19, 29,
    28, 14, 39, 12, 38, 41, 13, 37, 48, 7, 16, 24, 55, 40, 61, 26, 17, 0, 1, 60, 51, 30, 4, 22,
    25, 54, 21, 56, 59, 6, 63, 57, 62, 11, 36, 20, 34, 44, 52,
];

/// Characters stripped from parameter values before signing
const FILTERED_CHARS: [char; 5] = ['!', '\'', '(', ')', '*'];

/// The two rotating keys the signature is derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKeys {
    /// Image key
    pub img_key: String,
    /// Sub key
    pub sub_key: String,
}

impl SigningKeys {
    /// Create keys from their raw values
    pub fn new(img_key: impl Into<String>, sub_key: impl Into<String>) -> Self {
        Self {
            img_key: img_key.into(),
            sub_key: sub_key.into(),
        }
    }

    /// Derive keys from the two key-image URLs
    ///
    /// The key is the filename stem of each URL, e.g.
    /// `https://i0.hdslb.com/bfs/wbi/7cd0...77c.png` yields `7cd0...77c`.
    pub fn from_urls(img_url: &str, sub_url: &str) -> Self {
        Self {
            img_key: filename_stem(img_url),
            sub_key: filename_stem(sub_url),
        }
    }
}

/// Extract the filename without extension from a URL path
fn filename_stem(url: &str) -> String {
    url.rsplit('/')
        .next()
        .and_then(|name| name.split('.').next())
        .unwrap_or_default()
        .to_string()
}

/// Keyed signer for one request
#[derive(Debug, Clone)]
pub struct WbiSigner {
    keys: SigningKeys,
}

impl WbiSigner {
    /// Create a signer from the current key pair
    pub fn new(keys: SigningKeys) -> Self {
        Self { keys }
    }

    /// Derive the 32-character mixin key from the key pair
    pub fn mixin_key(&self) -> String {
        let raw: Vec<char> = format!("{}{}", self.keys.img_key, self.keys.sub_key)
            .chars()
            .collect();
        MIXIN_KEY_ENC_TAB
            .iter()
            .filter_map(|&i| raw.get(i))
            .take(32)
            .collect()
    }

    /// Sign parameters with the current Unix timestamp
    pub fn sign(&self, params: Vec<(String, String)>) -> Vec<(String, String)> {
        self.sign_at(params, chrono::Utc::now().timestamp())
    }

    /// Sign parameters with an explicit timestamp
    ///
    /// Output order is the canonical key-sorted order with `w_rid` appended
    /// last; the digest covers exactly that canonical query.
    pub fn sign_at(&self, params: Vec<(String, String)>, wts: i64) -> Vec<(String, String)> {
        let mut sorted: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k, filter_value(&v)))
            .collect();
        sorted.insert("wts".to_string(), wts.to_string());

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(sorted.iter())
            .finish();

        let mut hasher = Md5::new();
        hasher.update(query.as_bytes());
        hasher.update(self.mixin_key().as_bytes());
        let w_rid = hex::encode(hasher.finalize());

        let mut signed: Vec<(String, String)> = sorted.into_iter().collect();
        signed.push(("w_rid".to_string(), w_rid));
        signed
    }
}

/// Strip the reserved characters from a parameter value
fn filter_value(value: &str) -> String {
    value.chars().filter(|c| !FILTERED_CHARS.contains(c)).collect()
}
