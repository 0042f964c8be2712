use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use url::Url;

use super::error::FetchError;
use super::urls::DEFAULT_BASE_URL;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Send `view_adult=true` so adult works skip the interstitial.
    pub view_adult: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            view_adult: true,
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(base) = std::env::var("FANDOM_BASE_URL") {
            cfg.base_url = base;
        }
        if let Ok(ua) = std::env::var("FANDOM_USER_AGENT") {
            cfg.user_agent = ua;
        }
        if let Ok(timeout) = std::env::var("FANDOM_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        if let Ok(v) = std::env::var("FANDOM_VIEW_ADULT") {
            cfg.view_adult = !matches!(v.as_str(), "0" | "false" | "FALSE" | "no" | "NO");
        }
        cfg
    }
}

/// Page retrieval, injected so extraction and the crawl can run against canned HTML.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &Url) -> Result<String, FetchError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(cfg: &HttpConfig) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        if cfg.view_adult {
            headers.insert(header::COOKIE, header::HeaderValue::from_static("view_adult=true"));
        }
        let http = Client::builder()
            .timeout(cfg.timeout)
            .user_agent(cfg.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(FetchError::from_reqwest)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status });
        }
        response.text().await.map_err(FetchError::from_reqwest)
    }
}

#[cfg(test)]
pub use stub::StubFetcher;
