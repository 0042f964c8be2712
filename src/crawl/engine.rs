use anyhow::Result;
use scraper::Html;
use serde::Serialize;
use tracing::Instrument;

use crate::archive::{DetailSource, ExtractError, FetchError, Fetcher};
use crate::archive::extract::{extract_record, work_fragments};
use crate::archive::urls::{detail_url, listing_url};
use crate::output::RecordSink;
use crate::telemetry::{self, ctx::LogCtx};
use crate::telemetry::ops::crawl::{Crawl, Phase as CrawlPhase};

use super::config::CrawlConfig;
use super::pace::pause;
use super::state::CrawlState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScope { Page, Item }

/// One skipped page or work.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub scope: ErrorScope,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CrawlSummary {
    pub pages_visited: Vec<u32>,
    pub records: usize,
    pub item_errors: usize,
    pub page_errors: usize,
    pub errors: Vec<ErrorReport>,
}

pub struct Crawler<'a> {
    config: &'a CrawlConfig,
    fetcher: &'a dyn Fetcher,
    log: LogCtx<Crawl>,
}

impl<'a> Crawler<'a> {
    pub fn new(config: &'a CrawlConfig, fetcher: &'a dyn Fetcher) -> Self {
        Self { config, fetcher, log: telemetry::crawl() }
    }

    /// Walk the configured page range, one page fully processed at a time.
    /// Only sink failures abort the run.
    pub async fn run(&self, sink: &mut dyn RecordSink) -> Result<CrawlSummary> {
        let mut summary = CrawlSummary::default();
        let mut state = CrawlState::start(&self.config.range);

        loop {
            self.log.debug(format!("state={}", state.name()));
            state = match state {
                CrawlState::FetchingPage(page) => {
                    let span = self.log.span_kv(&CrawlPhase::Page, [("page", page.to_string())]);
                    self.fetch_page(page, &mut summary).instrument(span).await?
                }
                CrawlState::ExtractingItems { page, doc } => {
                    self.extract_items(page, &doc, sink, &mut summary).await?;
                    CrawlState::after_page(&self.config.range, page)
                }
                CrawlState::Pausing { next } => {
                    pause(self.config.pause).instrument(self.log.span(&CrawlPhase::Pause)).await;
                    CrawlState::FetchingPage(next)
                }
                CrawlState::Done => break,
            };
        }

        sink.finish()?;
        self.log.totals(summary.pages_visited.len(), summary.records, summary.item_errors, summary.page_errors);
        if !summary.errors.is_empty() {
            let skipped: Vec<String> = summary
                .errors
                .iter()
                .map(|e| match (&e.scope, &e.work_id) {
                    (ErrorScope::Item, Some(id)) => format!("work {id}"),
                    (ErrorScope::Item, None) => format!("item on page {}", e.page),
                    (ErrorScope::Page, _) => format!("page {}", e.page),
                })
                .collect();
            self.log.warn(format!("Skipped {}: {}", skipped.len(), skipped.join(", ")));
        }
        Ok(summary)
    }

    async fn fetch_page(&self, page: u32, summary: &mut CrawlSummary) -> Result<CrawlState> {
        summary.pages_visited.push(page);

        let url = listing_url(&self.config.http.base_url, &self.config.tag, page)?;
        self.log.info(format!("📄 page {} — {}", page, url));

        let html = match self.fetcher.get(&url).instrument(self.log.span(&CrawlPhase::FetchPage)).await {
            Ok(html) => html,
            Err(e) => {
                self.page_failed(page, url.as_str(), &e, summary);
                return Ok(CrawlState::after_page(&self.config.range, page));
            }
        };

        let doc = { let _s = self.log.span(&CrawlPhase::ParsePage).entered(); Html::parse_document(&html) };
        let count = work_fragments(&doc).len();
        self.log.info(format!("Retrieved {} works from page {}", count, page));
        if count == 0 {
            // Walking down from beyond the last results page: keep going until works show up.
            if self.config.range.descending() && summary.records == 0 && summary.item_errors == 0 {
                self.log.info(format!("⏭️ page {} is past the end of results, continuing down", page));
                return Ok(CrawlState::after_page(&self.config.range, page));
            }
            self.log.info(format!("🏁 Reached end of search results at page {}", page));
            return Ok(CrawlState::Done);
        }
        Ok(CrawlState::ExtractingItems { page, doc })
    }

    async fn extract_items(
        &self,
        page: u32,
        doc: &Html,
        sink: &mut dyn RecordSink,
        summary: &mut CrawlSummary,
    ) -> Result<()> {
        let detail = DetailSource::new(self.fetcher, &self.config.http.base_url, &self.config.detail)
            .with_span(|| telemetry::crawl().span(&CrawlPhase::FetchDetail));
        let mut records = 0usize;
        let mut errors = 0usize;

        for (i, fragment) in work_fragments(doc).into_iter().enumerate() {
            match extract_record(fragment, detail).instrument(self.log.span(&CrawlPhase::Extract)).await {
                Ok(rec) => {
                    let _w = self.log.span(&CrawlPhase::Write).entered();
                    sink.write(&rec)?;
                    records += 1;
                    self.log.debug(format!("➕ work {} — {}", rec.id, rec.title));
                }
                Err(e) => {
                    errors += 1;
                    self.item_failed(page, i + 1, e, summary);
                }
            }
        }

        summary.records += records;
        summary.item_errors += errors;
        self.log.page_summary(page, records, errors);
        Ok(())
    }

    fn page_failed(&self, page: u32, url: &str, e: &FetchError, summary: &mut CrawlSummary) {
        self.log.warn_kv("⚠️ page fetch failed, skipping", [
            ("page", page.to_string()),
            ("url", url.to_string()),
            ("retryable", e.is_retryable().to_string()),
            ("error", e.to_string()),
        ]);
        summary.page_errors += 1;
        summary.errors.push(ErrorReport {
            scope: ErrorScope::Page,
            page,
            work_id: None,
            url: Some(url.to_string()),
            message: e.to_string(),
        });
    }

    fn item_failed(&self, page: u32, position: usize, e: ExtractError, summary: &mut CrawlSummary) {
        let url = e
            .work_id
            .as_deref()
            .and_then(|id| detail_url(&self.config.http.base_url, id).ok())
            .map(|u| u.to_string());
        self.log.warn_kv("↩️ skip", [
            ("page", page.to_string()),
            ("item", position.to_string()),
            ("url", url.clone().unwrap_or_else(|| "-".to_string())),
            ("transport", e.is_transport().to_string()),
            ("error", e.to_string()),
        ]);
        summary.errors.push(ErrorReport {
            scope: ErrorScope::Item,
            page,
            work_id: e.work_id.clone(),
            url,
            message: e.kind.to_string(),
        });
    }
}
