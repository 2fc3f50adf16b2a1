//! Kuaishou client
//!
//! Every operation is a POST against the GraphQL endpoint with a
//! registry-resolved query body; responses mark success by the absence of an
//! `errors` field. Comment pagination uses an opaque continuation token with
//! the literal `no_more` sentinel.

use crate::config::Settings;
use crate::media::{AssemblyRunner, FfmpegRunner, MediaPipeline};
use crate::pagination::{Aggregator, PageSink};
use crate::session::{SessionManager, SessionProvider};
use crate::sign::GraphqlTemplates;
use crate::transport::{ApiTransport, SuccessMarker};
use crate::types::{CommentRecord, Cursor, NO_MORE, Page, RequestDescriptor, StreamManifest, VideoRecord};
use crate::Result;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Platform name, also the output subdirectory for downloaded media
pub const PLATFORM: &str = "kuaishou";

const GRAPHQL_HOST: &str = "https://www.kuaishou.com/graphql";
const WWW_HOST: &str = "https://www.kuaishou.com";

/// Convenience alias for the client with the default ffmpeg runner
pub type KuaishouClient = KuaishouClientGeneric<FfmpegRunner>;

/// Kuaishou API client
#[derive(Debug)]
pub struct KuaishouClientGeneric<R: AssemblyRunner = FfmpegRunner> {
    /// Crawler configuration
    settings: Settings,
    /// One-shot request executor with the errors-field success marker
    transport: ApiTransport,
    /// Shared header/cookie state
    session: SessionManager,
    /// Externally supplied GraphQL template registry
    templates: GraphqlTemplates,
    /// Media acquisition pipeline
    pipeline: MediaPipeline<R>,
    /// GraphQL endpoint, overridable for tests and proxies
    host: String,
}

impl KuaishouClientGeneric<FfmpegRunner> {
    /// Create a client with the default ffmpeg runner
    pub fn new(settings: Settings, templates: GraphqlTemplates) -> Self {
        let runner = FfmpegRunner::new(settings.media.ffmpeg_path.clone());
        Self::with_runner(settings, templates, runner)
    }
}

impl<R: AssemblyRunner> KuaishouClientGeneric<R> {
    /// Create a client with a custom assembly runner
    pub fn with_runner(settings: Settings, templates: GraphqlTemplates, runner: R) -> Self {
        let transport = ApiTransport::new(SuccessMarker::ErrorsField, settings.timeout());
        let session = SessionManager::new(default_headers(&settings.http.user_agent));
        let pipeline = MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), runner);

        Self {
            settings,
            transport,
            session,
            templates,
            pipeline,
            host: GRAPHQL_HOST.to_string(),
        }
    }

    /// Override the GraphQL endpoint
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Shared session state
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Replace cookie state from a freshly harvested browser session
    pub async fn update_cookies(&self, provider: &dyn SessionProvider) -> Result<()> {
        self.session.refresh(provider).await
    }

    /// Login-liveness probe
    ///
    /// Returns true only when the profile operation reports a logged-in
    /// result; every failure, including a missing template, maps to false.
    pub async fn pong(&self) -> bool {
        tracing::info!("checking kuaishou login state");
        let body = match self.templates.render(
            "visionProfileUserList",
            "vision_profile",
            json!({"ftype": 1}),
        ) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "login probe template missing, assuming logged out");
                return false;
            }
        };

        match self.post(body).await {
            Ok(data) => data["visionProfileUserList"]["result"].as_i64() == Some(1),
            Err(err) => {
                tracing::warn!(error = %err, "login probe failed, assuming logged out");
                false
            }
        }
    }

    /// Search content by keyword with a continuation cursor
    pub async fn search_info_by_keyword(&self, keyword: &str, pcursor: &str) -> Result<Value> {
        let body = self.templates.render(
            "visionSearchPhoto",
            "search_query",
            json!({
                "keyword": keyword,
                "pcursor": pcursor,
                "page": "search",
            }),
        )?;
        self.post(body).await
    }

    /// Fetch video detail by photo id
    pub async fn get_video_info(&self, photo_id: &str) -> Result<VideoRecord> {
        let body = self.templates.render(
            "visionVideoDetail",
            "video_detail",
            json!({
                "photoId": photo_id,
                "page": "search",
            }),
        )?;
        let data = self.post(body).await?;
        VideoRecord::from_payload(
            data["visionVideoDetail"].clone(),
            &["photo", "id"],
            &["photo", "caption"],
            &["author", "name"],
        )
    }

    /// Fetch one page of comments for a video
    pub async fn get_video_comments(&self, photo_id: &str, pcursor: &str) -> Result<Page> {
        let body = self.templates.render(
            "commentListQuery",
            "comment_list",
            json!({
                "photoId": photo_id,
                "pcursor": pcursor,
            }),
        )?;
        let data = self.post(body).await?;
        parse_comment_page(&data)
    }

    /// Fetch the full comment history for a video
    ///
    /// Pages are emitted to `sink` as they arrive and accumulated into the
    /// returned vector. `fetch_sub_comments` is accepted but reply-thread
    /// expansion is not implemented and contributes no additional items.
    pub async fn get_video_all_comments(
        &self,
        photo_id: &str,
        sink: Option<&dyn PageSink>,
        fetch_sub_comments: bool,
    ) -> Result<Vec<CommentRecord>> {
        let aggregator = Aggregator::new(self.settings.crawl_interval(), fetch_sub_comments);
        aggregator
            .collect(
                photo_id,
                Cursor::token_start(),
                |cursor| {
                    let pcursor = match cursor {
                        Cursor::Token { pcursor } => pcursor,
                        _ => String::new(),
                    };
                    async move { self.get_video_comments(photo_id, &pcursor).await }
                },
                sink,
            )
            .await
    }

    /// Acquire the media and thumbnail for one video item
    ///
    /// The item's `photo.photoUrl` decides the strategy: a playlist-marked
    /// URL is reassembled from its segments, anything else is fetched as a
    /// single container. Failures are logged and contained.
    pub async fn download_video(&self, video_item: &Value) {
        if !self.pipeline.enabled() {
            tracing::info!("media download not enabled, skipping");
            return;
        }

        let photo = &video_item["photo"];
        let Some(url) = photo["photoUrl"].as_str().filter(|u| !u.is_empty()) else {
            tracing::debug!("video item carries no photoUrl, skipping");
            return;
        };
        let Some(photo_id) = photo["id"].as_str() else {
            tracing::debug!("video item carries no photo id, skipping");
            return;
        };

        let manifest = StreamManifest::from_source_url(url);
        let headers = self.session.headers().await;
        self.pipeline
            .acquire(PLATFORM, photo_id, &manifest, &headers)
            .await;
    }

    async fn post(&self, body: Value) -> Result<Value> {
        let descriptor = RequestDescriptor::post(self.host.clone())
            .with_headers(self.session.headers().await)
            .with_body(body);
        self.transport.execute(&descriptor).await
    }
}

/// Parse one comment page payload into items plus the advanced cursor
fn parse_comment_page(data: &Value) -> Result<Page> {
    let list = &data["visionCommentList"];
    let items = list["rootComments"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|comment| {
            CommentRecord::from_payload(comment, &["commentId"], &["authorName"], &["content"])
        })
        .collect::<Result<Vec<_>>>()?;

    // A response without a continuation token terminates pagination
    let pcursor = list["pcursor"].as_str().unwrap_or(NO_MORE).to_string();
    Ok(Page {
        items,
        cursor: Cursor::Token { pcursor },
    })
}

fn default_headers(user_agent: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("User-Agent".to_string(), user_agent.to_string());
    headers.insert("Referer".to_string(), format!("{}/", WWW_HOST));
    headers.insert("Accept".to_string(), "application/json".to_string());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_comment_page() {
        let data = json!({
            "visionCommentList": {
                "pcursor": "cursor123",
                "rootComments": [
                    {"commentId": "c1", "authorName": "alice", "content": "hello"},
                    {"commentId": "c2", "authorName": "bob", "content": "world"}
                ]
            }
        });

        let page = parse_comment_page(&data).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "c1");
        assert_eq!(page.items[1].content, "world");
        assert_eq!(
            page.cursor,
            Cursor::Token {
                pcursor: "cursor123".to_string()
            }
        );
        assert!(!page.cursor.is_end());
    }

    #[test]
    fn test_parse_comment_page_sentinel() {
        let data = json!({
            "visionCommentList": {"pcursor": "no_more", "rootComments": []}
        });
        let page = parse_comment_page(&data).unwrap();
        assert!(page.cursor.is_end());
    }

    #[test]
    fn test_parse_comment_page_missing_cursor_terminates() {
        let page = parse_comment_page(&json!({})).unwrap();
        assert!(page.items.is_empty());
        assert!(page.cursor.is_end());
    }
}
