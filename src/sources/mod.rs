// src/sources/mod.rs
pub mod govtrack;
pub mod house_clerk;
pub mod senate_lis;

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::model::{DateWindow, VoteRecord};

/// Static identity of a vote source, used to seed its `SourceStatus`
/// entry. `priority` is documentation only; attempt order is the slice
/// order the orchestrator receives.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    /// Status-map key, e.g. "house.clerk" or "govtrack.senate".
    pub key: String,
    pub name: String,
    pub domain: String,
    pub url: String,
    pub priority: u32,
}

/// One vote provider. Official fetchers swallow their internal errors and
/// always return `Ok`; the fallback aggregator propagates transport errors
/// and relies on the orchestrator to catch them.
#[async_trait]
pub trait VoteSource: Send + Sync {
    fn descriptor(&self) -> SourceDescriptor;

    async fn fetch(&self, window: DateWindow, cap: usize) -> Result<Vec<VoteRecord>>;
}

/// Text-page transport used by the official crawlers. `None` covers both
/// transport errors and non-2xx responses, so callers get a single
/// skip-this-item signal.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get_text(&self, url: &str) -> Option<String>;
}

/// reqwest-backed fetcher with a friendly User-Agent; one client reused
/// across the whole crawl.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent.to_string())
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Option<String> {
        let resp = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%url, error = %e, "page fetch failed");
                return None;
            }
        };

        let status = resp.status();
        debug!(%url, %status, "GET");
        if !status.is_success() {
            return None;
        }
        resp.text().await.ok()
    }
}

// --- Test helper ---
/// Serves canned page bodies by exact URL; anything unknown is a miss,
/// which exercises the same skip paths a dead upstream would.
#[derive(Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticPages {
    async fn get_text(&self, url: &str) -> Option<String> {
        self.pages.get(url).cloned()
    }
}
