use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, Instrument, Span};

use super::date::parse_detail_date;
use super::error::ExtractError;
use super::fetch::Fetcher;
use super::types::{Rating, WorkDate};
use super::urls::detail_url;

pub const DEFAULT_DETAIL_DELAY_MS: u64 = 500;

/// When and how the work page is fetched for multi-chapter works.
#[derive(Clone, Debug)]
pub struct DetailPolicy {
    pub enabled: bool,
    /// Slept before every detail request.
    pub delay: Duration,
    /// Ratings whose work pages are not requested (some are login-gated).
    pub skip_ratings: Vec<Rating>,
}

impl Default for DetailPolicy {
    fn default() -> Self {
        Self { enabled: true, delay: Duration::from_millis(DEFAULT_DETAIL_DELAY_MS), skip_ratings: Vec::new() }
    }
}

impl DetailPolicy {
    pub fn disabled() -> Self { Self { enabled: false, ..Self::default() } }

    pub fn should_fetch(&self, rating: Rating) -> bool {
        self.enabled && !self.skip_ratings.contains(&rating)
    }
}

/// Everything the extractor needs to make the secondary request.
#[derive(Clone, Copy)]
pub struct DetailSource<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub base_url: &'a str,
    pub policy: &'a DetailPolicy,
    /// Span the detail request runs in.
    pub span: fn() -> Span,
}

impl<'a> DetailSource<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, base_url: &'a str, policy: &'a DetailPolicy) -> Self {
        Self { fetcher, base_url, policy, span: Span::none }
    }

    pub fn with_span(self, span: fn() -> Span) -> Self { Self { span, ..self } }

    /// Fetch the work page and read its original publish date.
    pub async fn fetch_published(&self, work_id: &str) -> Result<WorkDate, ExtractError> {
        let url = detail_url(self.base_url, work_id).map_err(|_| ExtractError::malformed("work id"))?;
        if !self.policy.delay.is_zero() {
            tokio::time::sleep(self.policy.delay).await;
        }
        debug!(url = %url, "fetch detail");
        let html = self
            .fetcher
            .get(&url)
            .instrument((self.span)())
            .await
            .map_err(|e| ExtractError::new(Some(work_id.to_string()), e))?;
        published_from_detail(&html).map_err(|e| e.for_work(work_id))
    }
}

/// Read `dd.published` from a work page.
pub fn published_from_detail(html: &str) -> Result<WorkDate, ExtractError> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("dd.published").map_err(|_| ExtractError::malformed("dd.published"))?;
    let node = doc.select(&sel).next().ok_or_else(|| ExtractError::malformed("dd.published"))?;
    let text = node.text().collect::<String>();
    parse_detail_date(&text)
}
