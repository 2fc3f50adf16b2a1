//! Media pipeline integration tests
//!
//! Exercises the acquisition strategies against a mock CDN: dash mux, legacy
//! direct download, segmented playlist reassembly, the disabled switch and
//! the cleanup guarantees on failure.

mod common;

use common::{FailingRunner, FakeRunner, dir_entries, test_settings};
use media_crawler::media::MediaPipeline;
use media_crawler::types::{MediaTrack, StreamManifest};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn track(url: String) -> MediaTrack {
    MediaTrack {
        base_url: url,
        extra: serde_json::Map::new(),
    }
}

async fn mount_bytes(server: &MockServer, route: &str, body: &[u8], delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_segments_assembled_in_index_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/live/stream.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "#EXTM3U\n#EXTINF:4.0,\nseg_0.ts\n#EXTINF:4.0,\nseg_1.ts\n#EXTINF:2.0,\nseg_2.ts\n#EXT-X-ENDLIST\n",
        ))
        .mount(&server)
        .await;

    // Inverted delays: segment 2 completes first, segment 0 last
    mount_bytes(&server, "/live/seg_0.ts", b"AAAA", 250).await;
    mount_bytes(&server, "/live/seg_1.ts", b"BBBB", 120).await;
    mount_bytes(&server, "/live/seg_2.ts", b"CCCC", 0).await;

    let settings = test_settings(dir.path());
    let pipeline = MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), FakeRunner);
    let manifest = StreamManifest::SegmentedPlaylist {
        url: format!("{}/live/stream.m3u8", server.uri()),
    };

    pipeline
        .acquire("kuaishou", "3xtest", &manifest, &HashMap::new())
        .await;

    // Assembly consumed the segments by index, not by completion order
    let output = std::fs::read(dir.path().join("kuaishou/3xtest.mp4")).unwrap();
    assert_eq!(output, b"AAAABBBBCCCC".to_vec());

    // Segment files are gone, only the media and its thumbnail remain
    assert_eq!(
        dir_entries(&dir.path().join("kuaishou")),
        vec!["3xtest.jpeg".to_string(), "3xtest.mp4".to_string()]
    );
}

#[tokio::test]
async fn test_disabled_pipeline_is_a_noop() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut settings = test_settings(dir.path());
    settings.media.enable_download = false;

    let pipeline = MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), FakeRunner);
    let manifest = StreamManifest::Legacy {
        url: format!("{}/clip.mp4", server.uri()),
    };

    pipeline
        .acquire("bilibili", "170001", &manifest, &HashMap::new())
        .await;

    // Zero network requests and zero file writes
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(dir_entries(dir.path()), Vec::<String>::new());
}

#[tokio::test]
async fn test_dash_tracks_muxed_and_intermediates_removed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_bytes(&server, "/video.m4s", b"VIDEO", 0).await;
    mount_bytes(&server, "/audio.m4s", b"AUDIO", 0).await;

    let settings = test_settings(dir.path());
    let pipeline = MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), FakeRunner);
    let manifest = StreamManifest::Dash {
        video: vec![track(format!("{}/video.m4s", server.uri()))],
        audio: vec![track(format!("{}/audio.m4s", server.uri()))],
    };

    pipeline
        .acquire("bilibili", "170001", &manifest, &HashMap::new())
        .await;

    let output = std::fs::read(dir.path().join("bilibili/170001.mp4")).unwrap();
    assert_eq!(output, b"VIDEOAUDIO".to_vec());
    assert_eq!(
        dir_entries(&dir.path().join("bilibili")),
        vec!["170001.jpeg".to_string(), "170001.mp4".to_string()]
    );
}

#[tokio::test]
async fn test_dash_without_audio_keeps_video_track() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_bytes(&server, "/video.m4s", b"VIDEOONLY", 0).await;

    let settings = test_settings(dir.path());
    let pipeline = MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), FakeRunner);
    let manifest = StreamManifest::Dash {
        video: vec![track(format!("{}/video.m4s", server.uri()))],
        audio: Vec::new(),
    };

    pipeline
        .acquire("bilibili", "170002", &manifest, &HashMap::new())
        .await;

    let output = std::fs::read(dir.path().join("bilibili/170002.mp4")).unwrap();
    assert_eq!(output, b"VIDEOONLY".to_vec());
}

#[tokio::test]
async fn test_legacy_container_downloaded_directly() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_bytes(&server, "/av170003.flv", b"LEGACY", 0).await;

    let settings = test_settings(dir.path());
    let pipeline = MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), FakeRunner);
    let manifest = StreamManifest::Legacy {
        url: format!("{}/av170003.flv", server.uri()),
    };

    pipeline
        .acquire("bilibili", "170003", &manifest, &HashMap::new())
        .await;

    // One media file with the source container extension, one thumbnail
    let output = std::fs::read(dir.path().join("bilibili/170003.flv")).unwrap();
    assert_eq!(output, b"LEGACY".to_vec());
    assert_eq!(
        dir_entries(&dir.path().join("bilibili")),
        vec!["170003.flv".to_string(), "170003.jpeg".to_string()]
    );
}

#[tokio::test]
async fn test_failed_track_download_leaves_no_artifacts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_bytes(&server, "/video.m4s", b"VIDEO", 0).await;
    Mock::given(method("GET"))
        .and(path("/audio.m4s"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let settings = test_settings(dir.path());
    let pipeline = MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), FakeRunner);
    let manifest = StreamManifest::Dash {
        video: vec![track(format!("{}/video.m4s", server.uri()))],
        audio: vec![track(format!("{}/audio.m4s", server.uri()))],
    };

    pipeline
        .acquire("bilibili", "170004", &manifest, &HashMap::new())
        .await;

    // The already-downloaded video track was cleaned up with everything else
    assert_eq!(
        dir_entries(&dir.path().join("bilibili")),
        Vec::<String>::new()
    );
}

#[tokio::test]
async fn test_empty_body_is_a_download_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_bytes(&server, "/clip.mp4", b"", 0).await;

    let settings = test_settings(dir.path());
    let pipeline = MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), FakeRunner);
    let manifest = StreamManifest::Legacy {
        url: format!("{}/clip.mp4", server.uri()),
    };

    pipeline
        .acquire("bilibili", "170005", &manifest, &HashMap::new())
        .await;

    // Neither the canonical file nor a .part file survives
    assert_eq!(
        dir_entries(&dir.path().join("bilibili")),
        Vec::<String>::new()
    );
}

#[tokio::test]
async fn test_failed_assembly_leaves_no_artifacts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/live/stream.m3u8"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("#EXTM3U\nseg_0.ts\nseg_1.ts\n#EXT-X-ENDLIST\n"),
        )
        .mount(&server)
        .await;
    mount_bytes(&server, "/live/seg_0.ts", b"AAAA", 0).await;
    mount_bytes(&server, "/live/seg_1.ts", b"BBBB", 0).await;

    let settings = test_settings(dir.path());
    let pipeline =
        MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), FailingRunner);
    let manifest = StreamManifest::SegmentedPlaylist {
        url: format!("{}/live/stream.m3u8", server.uri()),
    };

    pipeline
        .acquire("kuaishou", "3xfail", &manifest, &HashMap::new())
        .await;

    assert_eq!(
        dir_entries(&dir.path().join("kuaishou")),
        Vec::<String>::new()
    );
}
