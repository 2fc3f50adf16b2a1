//! Session manager
//!
//! Owns the shared credential state and refreshes it from an external
//! session provider. One writer (the refresh operation), many readers (every
//! signed and unsigned request).

use crate::Result;
use crate::session::credentials::{HarvestedCookie, SessionCredentials};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// External source of session state
///
/// Implemented outside this crate by whatever drives the browser session;
/// yields a freshly harvested cookie set and can evaluate page-local
/// storage values.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Harvest the current cookie set
    async fn harvest_cookies(&self) -> Result<Vec<HarvestedCookie>>;

    /// Read a value from the session's page-local storage
    async fn local_storage(&self, key: &str) -> Result<Option<String>>;
}

/// Shared credential state for one platform session
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Credential state behind a single-writer/many-reader lock
    credentials: Arc<RwLock<SessionCredentials>>,
}

impl SessionManager {
    /// Create a manager seeded with an initial header set
    ///
    /// # Examples
    ///
    /// ```rust
    /// use media_crawler::session::SessionManager;
    /// use std::collections::HashMap;
    ///
    /// # tokio_test::block_on(async {
    /// let manager = SessionManager::new(HashMap::new());
    /// assert!(manager.cookie("SESSDATA").await.is_none());
    /// # });
    /// ```
    pub fn new(headers: HashMap<String, String>) -> Self {
        Self {
            credentials: Arc::new(RwLock::new(SessionCredentials::new(headers))),
        }
    }

    /// Replace cookie state from a freshly harvested set
    ///
    /// The Cookie header and the cookie mapping are swapped inside one write
    /// critical section, so a concurrent request reads either the old or the
    /// new set, never a mix.
    pub async fn refresh(&self, provider: &dyn SessionProvider) -> Result<()> {
        let cookies = provider.harvest_cookies().await?;

        let mut credentials = self.credentials.write().await;
        credentials.apply_cookies(&cookies);
        tracing::info!("Session cookies refreshed, {} cookies", cookies.len());
        Ok(())
    }

    /// Snapshot of the current headers for one request
    pub async fn headers(&self) -> HashMap<String, String> {
        self.credentials.read().await.headers.clone()
    }

    /// Look up a cookie value by name
    pub async fn cookie(&self, name: &str) -> Option<String> {
        self.credentials.read().await.cookies.get(name).cloned()
    }
}
