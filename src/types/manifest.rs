//! Stream manifest resolution
//!
//! A manifest describes how the media for one item can be acquired. It always
//! resolves to exactly one of three shapes: paired adaptive track lists, a
//! single legacy container URL, or a segmented-playlist URL.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Marker identifying a segmented playlist source URL
const PLAYLIST_MARKER: &str = "m3u8";

/// Marker the watch page embeds its play info behind
static PLAYINFO_RE: OnceLock<regex::Regex> = OnceLock::new();

/// One adaptive track with its byte-range URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaTrack {
    /// Direct URL for the track bytes
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    /// Remaining track fields, schema unknown
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Description of the available media for one item
#[derive(Debug, Clone)]
pub enum StreamManifest {
    /// Separate adaptive video and audio track lists
    Dash {
        /// Video tracks, best first
        video: Vec<MediaTrack>,
        /// Audio tracks, best first; may be empty
        audio: Vec<MediaTrack>,
    },
    /// Single legacy container URL
    Legacy {
        /// Direct container URL
        url: String,
    },
    /// Segmented playlist whose body lists ordered segment URLs
    SegmentedPlaylist {
        /// Playlist URL
        url: String,
    },
}

impl StreamManifest {
    /// Extract the embedded play info JSON from a watch page body
    pub fn extract_playinfo(html: &str) -> Result<Value> {
        let re = PLAYINFO_RE.get_or_init(|| {
            regex::Regex::new(r"<script>window\.__playinfo__=(.*?)</script>")
                .expect("playinfo regex is valid")
        });
        let captures = re
            .captures(html)
            .ok_or_else(|| Error::internal("watch page carries no playinfo block"))?;
        Ok(serde_json::from_str(&captures[1])?)
    }

    /// Resolve a manifest from play info JSON
    ///
    /// Items published with adaptive streaming carry `data.dash` with
    /// separate video and audio track lists; older items only carry a single
    /// container URL under `data.durl`.
    pub fn from_playinfo(playinfo: &Value) -> Result<Self> {
        let data = &playinfo["data"];

        if let Some(video) = data["dash"]["video"].as_array()
            && !video.is_empty()
        {
            let video = parse_tracks(video)?;
            let audio = match data["dash"]["audio"].as_array() {
                Some(entries) => parse_tracks(entries)?,
                None => Vec::new(),
            };
            return Ok(Self::Dash { video, audio });
        }

        if let Some(url) = data["durl"][0]["url"].as_str() {
            return Ok(Self::Legacy {
                url: url.to_string(),
            });
        }

        Err(Error::internal("playinfo contains no playable stream"))
    }

    /// Resolve a manifest from a plain source URL
    ///
    /// URLs carrying the playlist marker name a segmented playlist; anything
    /// else is a single container.
    pub fn from_source_url(url: &str) -> Self {
        if url.contains(PLAYLIST_MARKER) {
            Self::SegmentedPlaylist {
                url: url.to_string(),
            }
        } else {
            Self::Legacy {
                url: url.to_string(),
            }
        }
    }
}

fn parse_tracks(entries: &[Value]) -> Result<Vec<MediaTrack>> {
    entries
        .iter()
        .map(|entry| serde_json::from_value(entry.clone()).map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dash_playinfo() -> Value {
        json!({
            "data": {
                "dash": {
                    "video": [{"baseUrl": "https://cdn.example.com/v.m4s", "id": 80}],
                    "audio": [{"baseUrl": "https://cdn.example.com/a.m4s", "id": 30280}]
                }
            }
        })
    }

    #[test]
    fn test_extract_playinfo() {
        let html = r#"<html><script>window.__playinfo__={"data":{"durl":[{"url":"https://cdn.example.com/legacy.flv"}]}}</script></html>"#;
        let playinfo = StreamManifest::extract_playinfo(html).unwrap();
        assert_eq!(
            playinfo["data"]["durl"][0]["url"],
            "https://cdn.example.com/legacy.flv"
        );
    }

    #[test]
    fn test_extract_playinfo_missing() {
        assert!(StreamManifest::extract_playinfo("<html></html>").is_err());
    }

    #[test]
    fn test_dash_manifest() {
        let manifest = StreamManifest::from_playinfo(&dash_playinfo()).unwrap();
        match manifest {
            StreamManifest::Dash { video, audio } => {
                assert_eq!(video[0].base_url, "https://cdn.example.com/v.m4s");
                assert_eq!(audio[0].base_url, "https://cdn.example.com/a.m4s");
                assert_eq!(video[0].extra.get("id").unwrap(), 80);
            }
            other => panic!("expected dash manifest, got {:?}", other),
        }
    }

    #[test]
    fn test_legacy_manifest() {
        let playinfo = json!({
            "data": {"durl": [{"url": "https://cdn.example.com/legacy.flv"}]}
        });
        let manifest = StreamManifest::from_playinfo(&playinfo).unwrap();
        assert!(matches!(manifest, StreamManifest::Legacy { url } if url.ends_with("legacy.flv")));
    }

    #[test]
    fn test_empty_playinfo_rejected() {
        let playinfo = json!({"data": {}});
        assert!(StreamManifest::from_playinfo(&playinfo).is_err());
    }

    #[rstest::rstest]
    #[case("https://cdn.example.com/stream.m3u8", true)]
    #[case("https://cdn.example.com/playlist.m3u8?sign=abc", true)]
    #[case("https://cdn.example.com/video.mp4", false)]
    #[case("https://cdn.example.com/clip.flv", false)]
    fn test_source_url_shapes(#[case] url: &str, #[case] segmented: bool) {
        let manifest = StreamManifest::from_source_url(url);
        assert_eq!(
            matches!(manifest, StreamManifest::SegmentedPlaylist { .. }),
            segmented
        );
    }
}
