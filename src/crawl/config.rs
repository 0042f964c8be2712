use std::time::Duration;

use serde::Serialize;

use crate::archive::{DetailPolicy, HttpConfig, Rating};
use crate::archive::urls::listing_url;
use crate::output::{OutputFormat, OutputTarget};

use super::range::PageRange;

pub const DEFAULT_PAUSE_SECS: u64 = 5;

/// Everything one crawl run needs; built once from CLI args and env.
#[derive(Clone, Debug)]
pub struct CrawlConfig {
    pub tag: String,
    pub range: PageRange,
    /// Slept between listing pages.
    pub pause: Duration,
    pub format: OutputFormat,
    pub target: OutputTarget,
    pub pretty: bool,
    pub detail: DetailPolicy,
    pub http: HttpConfig,
}

#[derive(Serialize)]
pub struct CrawlPlan {
    pub tag: String,
    pub start: u32,
    pub end: u32,
    pub pages: u32,
    pub pause_secs: u64,
    pub output: String,
    pub detail_fetch: bool,
    pub detail_delay_ms: u128,
    pub skip_detail_ratings: Vec<Rating>,
    pub sample_urls: Vec<String>,
}

impl CrawlConfig {
    pub fn plan(&self, limit: usize) -> CrawlPlan {
        let sample_urls = self
            .range
            .pages()
            .take(limit)
            .filter_map(|p| listing_url(&self.http.base_url, &self.tag, p).ok())
            .map(|u| u.to_string())
            .collect();
        CrawlPlan {
            tag: self.tag.clone(),
            start: self.range.start,
            end: self.range.end,
            pages: self.range.page_count(),
            pause_secs: self.pause.as_secs(),
            output: self.target.to_string(),
            detail_fetch: self.detail.enabled,
            detail_delay_ms: self.detail.delay.as_millis(),
            skip_detail_ratings: self.detail.skip_ratings.clone(),
            sample_urls,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config(range: PageRange) -> CrawlConfig {
    CrawlConfig {
        tag: "Warrior Nun (TV)".into(),
        range,
        pause: Duration::ZERO,
        format: OutputFormat::Csv,
        target: OutputTarget::Stdout,
        pretty: false,
        detail: DetailPolicy { delay: Duration::ZERO, ..DetailPolicy::default() },
        http: HttpConfig::default(),
    }
}
