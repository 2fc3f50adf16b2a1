//! Bilibili client
//!
//! Read endpoints are signed with the WBI scheme; responses mark success
//! with `code == 0` and carry the payload under `data`. Comment pagination
//! uses an integer offset cursor with an explicit end flag.

use crate::config::Settings;
use crate::media::{AssemblyRunner, FfmpegRunner, MediaPipeline};
use crate::pagination::{Aggregator, PageSink};
use crate::session::{SessionManager, SessionProvider};
use crate::sign::{Signer, SigningKeys, WbiSigner};
use crate::transport::{ApiTransport, SuccessMarker};
use crate::types::{CommentRecord, Cursor, Page, RequestDescriptor, StreamManifest, VideoRecord};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Platform name, also the output subdirectory for downloaded media
pub const PLATFORM: &str = "bilibili";

const API_HOST: &str = "https://api.bilibili.com";
const WATCH_HOST: &str = "https://www.bilibili.com";

const NAV_URI: &str = "/x/web-interface/nav";
const SEARCH_URI: &str = "/x/web-interface/wbi/search/type";
const VIEW_URI: &str = "/x/web-interface/view/detail";
const COMMENTS_URI: &str = "/x/v2/reply/wbi/main";

/// Search result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrderType {
    /// Composite ranking
    #[default]
    Default,
    /// Most clicked first
    MostClick,
    /// Most recently published first
    LastPublish,
}

impl SearchOrderType {
    /// Wire value of the order parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "totalrank",
            Self::MostClick => "click",
            Self::LastPublish => "pubdate",
        }
    }
}

/// Comment ordering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentOrderType {
    /// Platform default ordering
    #[default]
    Default,
    /// Newest first
    Time,
    /// Hottest first
    Hot,
}

impl CommentOrderType {
    /// Wire value of the mode parameter
    pub fn mode(&self) -> i64 {
        match self {
            Self::Default => 0,
            Self::Time => 2,
            Self::Hot => 3,
        }
    }
}

/// Convenience alias for the client with the default ffmpeg runner
pub type BilibiliClient = BilibiliClientGeneric<FfmpegRunner>;

/// Bilibili API client
pub struct BilibiliClientGeneric<R: AssemblyRunner = FfmpegRunner> {
    /// Crawler configuration
    settings: Settings,
    /// One-shot request executor with the code-field success marker
    transport: ApiTransport,
    /// Shared header/cookie state
    session: SessionManager,
    /// External session provider, used for cookie refresh and key lookup
    provider: Option<Arc<dyn SessionProvider>>,
    /// Cached WBI keys, process lifetime until invalidated
    wbi_keys: RwLock<Option<SigningKeys>>,
    /// Media acquisition pipeline
    pipeline: MediaPipeline<R>,
    /// API host, overridable for tests and proxies
    api_host: String,
    /// Watch-page host the play info is extracted from
    watch_host: String,
}

impl BilibiliClientGeneric<FfmpegRunner> {
    /// Create a client with the default ffmpeg runner
    pub fn new(settings: Settings) -> Self {
        let runner = FfmpegRunner::new(settings.media.ffmpeg_path.clone());
        Self::with_runner(settings, runner)
    }
}

impl<R: AssemblyRunner> BilibiliClientGeneric<R> {
    /// Create a client with a custom assembly runner
    pub fn with_runner(settings: Settings, runner: R) -> Self {
        let transport = ApiTransport::new(SuccessMarker::CodeField, settings.timeout());
        let session = SessionManager::new(default_headers(&settings.http.user_agent));
        let pipeline = MediaPipeline::with_runner(settings.media.clone(), settings.timeout(), runner);

        Self {
            settings,
            transport,
            session,
            provider: None,
            wbi_keys: RwLock::new(None),
            pipeline,
            api_host: API_HOST.to_string(),
            watch_host: WATCH_HOST.to_string(),
        }
    }

    /// Attach the external session provider
    pub fn with_provider(mut self, provider: Arc<dyn SessionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Override the API host
    pub fn with_api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into();
        self
    }

    /// Override the watch-page host
    pub fn with_watch_host(mut self, host: impl Into<String>) -> Self {
        self.watch_host = host.into();
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
    /// Returns true only when the platform explicitly marks the caller
    /// logged in; every transport or API failure maps to false so callers
    /// can trigger re-authentication without error plumbing.
    pub async fn pong(&self) -> bool {
        tracing::info!("checking bilibili login state");
        match self.signed_get(NAV_URI, Vec::new()).await {
            Ok(data) => data["isLogin"].as_bool().unwrap_or(false),
            Err(err) => {
                tracing::warn!(error = %err, "login probe failed, assuming logged out");
                false
            }
        }
    }

    /// Search videos by keyword
    pub async fn search_video_by_keyword(
        &self,
        keyword: &str,
        page: u32,
        page_size: u32,
        order: SearchOrderType,
    ) -> Result<Value> {
        let params = vec![
            ("search_type".to_string(), "video".to_string()),
            ("keyword".to_string(), keyword.to_string()),
            ("page".to_string(), page.to_string()),
            ("page_size".to_string(), page_size.to_string()),
            ("order".to_string(), order.as_str().to_string()),
        ];
        self.signed_get(SEARCH_URI, params).await
    }

    /// Fetch video detail by `aid` or `bvid`; at least one is required
    pub async fn get_video_info(
        &self,
        aid: Option<u64>,
        bvid: Option<&str>,
    ) -> Result<VideoRecord> {
        let mut params = Vec::new();
        match (aid, bvid) {
            (Some(aid), _) => params.push(("aid".to_string(), aid.to_string())),
            (None, Some(bvid)) => params.push(("bvid".to_string(), bvid.to_string())),
            (None, None) => {
                return Err(Error::internal("either aid or bvid is required"));
            }
        }

        // Detail is an unsigned read endpoint
        let data = self.get(VIEW_URI, params, Signer::Null).await?;
        let view = if data["View"].is_object() {
            data["View"].clone()
        } else {
            data
        };
        VideoRecord::from_payload(view, &["bvid"], &["title"], &["owner", "name"])
    }

    /// Fetch one page of comments for a video
    pub async fn get_video_comments(
        &self,
        video_id: &str,
        order: CommentOrderType,
        next: i64,
    ) -> Result<Page> {
        let params = vec![
            ("oid".to_string(), video_id.to_string()),
            ("mode".to_string(), order.mode().to_string()),
            ("type".to_string(), "1".to_string()),
            ("ps".to_string(), "20".to_string()),
            ("next".to_string(), next.to_string()),
        ];
        let data = self.signed_get(COMMENTS_URI, params).await?;
        parse_comment_page(&data)
    }

    /// Fetch the full comment history for a video
    ///
    /// Pages are emitted to `sink` as they arrive and accumulated into the
    /// returned vector. `fetch_sub_comments` is accepted but reply-thread
    /// expansion is not implemented and contributes no additional items.
    pub async fn get_video_all_comments(
        &self,
        video_id: &str,
        sink: Option<&dyn PageSink>,
        fetch_sub_comments: bool,
    ) -> Result<Vec<CommentRecord>> {
        let aggregator = Aggregator::new(self.settings.crawl_interval(), fetch_sub_comments);
        aggregator
            .collect(
                video_id,
                Cursor::offset_start(),
                |cursor| {
                    let next = match cursor {
                        Cursor::Offset { next, .. } => next,
                        _ => 0,
                    };
                    self.get_video_comments(video_id, CommentOrderType::Default, next)
                },
                sink,
            )
            .await
    }

    /// Acquire the media and thumbnail for one video
    ///
    /// Fetches the watch page, extracts the embedded play info, resolves the
    /// manifest and hands it to the pipeline. Failures are logged and
    /// contained; the crawling flow is never interrupted.
    pub async fn download_video(&self, item_id: &str) {
        if !self.pipeline.enabled() {
            tracing::info!(item_id, "media download not enabled, skipping");
            return;
        }
        if let Err(err) = self.try_download_video(item_id).await {
            tracing::warn!(item_id, error = %err, "video download failed");
        }
    }

    async fn try_download_video(&self, item_id: &str) -> Result<()> {
        let headers = self.session.headers().await;
        let url = format!("{}/video/av{}/", self.watch_host, item_id);
        let descriptor = RequestDescriptor::get(url).with_headers(headers.clone());
        let body = self.transport.execute_raw(&descriptor).await?;

        let playinfo = StreamManifest::extract_playinfo(&body)?;
        let manifest = StreamManifest::from_playinfo(&playinfo)?;
        self.pipeline
            .acquire(PLATFORM, item_id, &manifest, &headers)
            .await;
        Ok(())
    }

    /// Current WBI keys, from the process cache, the session-local storage,
    /// or a live lookup against the nav endpoint
    pub async fn wbi_keys(&self) -> Result<SigningKeys> {
        if let Some(keys) = self.wbi_keys.read().await.clone() {
            return Ok(keys);
        }
        let keys = self.lookup_wbi_keys().await?;
        *self.wbi_keys.write().await = Some(keys.clone());
        Ok(keys)
    }

    /// Drop the cached WBI keys so the next signed request looks them up again
    pub async fn invalidate_wbi_keys(&self) {
        *self.wbi_keys.write().await = None;
    }

    async fn lookup_wbi_keys(&self) -> Result<SigningKeys> {
        if let Some(provider) = &self.provider {
            if let Ok(Some(urls)) = provider.local_storage("wbi_img_urls").await
                && let Some((img_url, sub_url)) = urls.split_once('-')
            {
                return Ok(SigningKeys::from_urls(img_url, sub_url));
            }
            if let (Ok(Some(img_url)), Ok(Some(sub_url))) = (
                provider.local_storage("wbi_img_url").await,
                provider.local_storage("wbi_sub_url").await,
            ) {
                return Ok(SigningKeys::from_urls(&img_url, &sub_url));
            }
        }

        let data = self
            .get(NAV_URI, Vec::new(), Signer::Null)
            .await
            .map_err(|e| Error::signing(format!("wbi key lookup failed: {}", e)))?;
        match (
            data["wbi_img"]["img_url"].as_str(),
            data["wbi_img"]["sub_url"].as_str(),
        ) {
            (Some(img_url), Some(sub_url)) => Ok(SigningKeys::from_urls(img_url, sub_url)),
            _ => Err(Error::signing("nav response carries no wbi keys")),
        }
    }

    /// Signed GET against the API host
    ///
    /// An empty parameter set carries nothing to sign and goes out as-is.
    async fn signed_get(&self, uri: &str, params: Vec<(String, String)>) -> Result<Value> {
        if params.is_empty() {
            return self.get(uri, params, Signer::Null).await;
        }
        let keys = self.wbi_keys().await?;
        let signer = WbiSigner::new(keys);
        self.get(uri, params, Signer::Keyed(&signer)).await
    }

    async fn get(
        &self,
        uri: &str,
        params: Vec<(String, String)>,
        signer: Signer<'_>,
    ) -> Result<Value> {
        let params = signer.sign(params)?;
        let descriptor = RequestDescriptor::get(format!("{}{}", self.api_host, uri))
            .with_params(params)
            .with_headers(self.session.headers().await);
        self.transport.execute(&descriptor).await
    }
}

/// Parse one comment page payload into items plus the advanced cursor
fn parse_comment_page(data: &Value) -> Result<Page> {
    let items = data["replies"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|reply| {
            CommentRecord::from_payload(reply, &["rpid"], &["member", "uname"], &["content", "message"])
        })
        .collect::<Result<Vec<_>>>()?;

    // A response without a cursor terminates pagination rather than looping
    let cursor = Cursor::Offset {
        next: data["cursor"]["next"].as_i64().unwrap_or(0),
        is_end: data["cursor"]["is_end"].as_bool().unwrap_or(true),
    };
    Ok(Page { items, cursor })
}

fn default_headers(user_agent: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("User-Agent".to_string(), user_agent.to_string());
    headers.insert("Referer".to_string(), format!("{}/", WATCH_HOST));
    headers.insert(
        "Accept".to_string(),
        "application/json, text/plain, */*".to_string(),
    );
    headers
}
