//! Platform payload records
//!
//! Comment and video payloads are semi-structured: the required fields are
//! validated explicitly and everything else is kept as an opaque remainder,
//! since the full platform schema is neither documented nor stable.

use crate::types::Cursor;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One comment as returned by a platform API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Platform-assigned comment id
    pub id: String,
    /// Display name of the comment author
    pub author: String,
    /// Comment text
    pub content: String,
    /// Remaining payload fields, schema unknown
    pub extra: Map<String, Value>,
}

/// One video/content item as returned by a platform API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform-assigned item id
    pub id: String,
    /// Item title
    pub title: String,
    /// Display name of the uploader
    pub author: String,
    /// Remaining payload fields, schema unknown
    pub extra: Map<String, Value>,
}

/// One page of comments plus the cursor for the next request
#[derive(Debug, Clone)]
pub struct Page {
    /// Comments in receipt order
    pub items: Vec<CommentRecord>,
    /// Cursor advanced from this response
    pub cursor: Cursor,
}

impl CommentRecord {
    /// Build a record from a raw payload, extracting the required fields by
    /// path and keeping the rest opaque.
    ///
    /// Paths support nested lookups such as `["member", "uname"]`.
    pub fn from_payload(
        payload: Value,
        id_path: &[&str],
        author_path: &[&str],
        content_path: &[&str],
    ) -> Result<Self> {
        let Value::Object(mut map) = payload else {
            return Err(Error::internal("comment payload is not an object"));
        };

        let id = lookup(&map, id_path)
            .ok_or_else(|| Error::internal(format!("comment payload missing {}", id_path.join("."))))?;
        let author = lookup(&map, author_path).unwrap_or_default();
        let content = lookup(&map, content_path).unwrap_or_default();

        if let [key] = id_path {
            map.remove(*key);
        }
        Ok(Self {
            id,
            author,
            content,
            extra: map,
        })
    }
}

impl VideoRecord {
    /// Build a record from a raw payload, mirroring
    /// [`CommentRecord::from_payload`].
    pub fn from_payload(
        payload: Value,
        id_path: &[&str],
        title_path: &[&str],
        author_path: &[&str],
    ) -> Result<Self> {
        let Value::Object(mut map) = payload else {
            return Err(Error::internal("video payload is not an object"));
        };

        let id = lookup(&map, id_path)
            .ok_or_else(|| Error::internal(format!("video payload missing {}", id_path.join("."))))?;
        let title = lookup(&map, title_path).unwrap_or_default();
        let author = lookup(&map, author_path).unwrap_or_default();

        if let [key] = id_path {
            map.remove(*key);
        }
        Ok(Self {
            id,
            title,
            author,
            extra: map,
        })
    }
}

/// Walk a nested path through an object and coerce the leaf to a string
fn lookup(map: &Map<String, Value>, path: &[&str]) -> Option<String> {
    let (first, rest) = path.split_first()?;
    let mut current = map.get(*first)?;
    for key in rest {
        current = current.get(key)?;
    }
    coerce_string(current)
}

/// Strings pass through, numbers are rendered; other shapes are rejected
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comment_from_nested_payload() {
        let payload = json!({
            "rpid": 123456,
            "member": {"uname": "alice", "mid": 42},
            "content": {"message": "nice video"},
            "like": 7
        });

        let record =
            CommentRecord::from_payload(payload, &["rpid"], &["member", "uname"], &["content", "message"])
                .unwrap();

        assert_eq!(record.id, "123456");
        assert_eq!(record.author, "alice");
        assert_eq!(record.content, "nice video");
        // remainder stays available
        assert_eq!(record.extra.get("like").unwrap(), 7);
        assert!(record.extra.contains_key("member"));
    }

    #[test]
    fn test_comment_from_flat_payload() {
        let payload = json!({
            "commentId": "abc",
            "authorName": "bob",
            "content": "first",
            "timestamp": 1700000000i64
        });

        let record =
            CommentRecord::from_payload(payload, &["commentId"], &["authorName"], &["content"])
                .unwrap();

        assert_eq!(record.id, "abc");
        assert_eq!(record.author, "bob");
        assert_eq!(record.content, "first");
    }

    #[test]
    fn test_comment_missing_id_rejected() {
        let payload = json!({"authorName": "bob"});
        let result = CommentRecord::from_payload(payload, &["commentId"], &["authorName"], &["content"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_optional_fields_default_empty() {
        let payload = json!({"rpid": 1});
        let record =
            CommentRecord::from_payload(payload, &["rpid"], &["member", "uname"], &["content", "message"])
                .unwrap();
        assert_eq!(record.author, "");
        assert_eq!(record.content, "");
    }

    #[test]
    fn test_video_record() {
        let payload = json!({
            "bvid": "BV1xx411c7mD",
            "title": "demo",
            "owner": {"name": "carol"}
        });

        let record =
            VideoRecord::from_payload(payload, &["bvid"], &["title"], &["owner", "name"]).unwrap();
        assert_eq!(record.id, "BV1xx411c7mD");
        assert_eq!(record.title, "demo");
        assert_eq!(record.author, "carol");
    }
}
