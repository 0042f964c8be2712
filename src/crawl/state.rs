use scraper::Html;

use super::range::PageRange;

/// FETCHING_PAGE -> EXTRACTING_ITEMS -> (PAUSING -> FETCHING_PAGE | DONE)
#[derive(Debug)]
pub enum CrawlState {
    FetchingPage(u32),
    ExtractingItems { page: u32, doc: Html },
    Pausing { next: u32 },
    Done,
}

impl CrawlState {
    pub fn start(range: &PageRange) -> Self { CrawlState::FetchingPage(range.start) }

    /// Transition once `page` has been handled (or skipped).
    pub fn after_page(range: &PageRange, page: u32) -> Self {
        match range.next(page) {
            Some(next) => CrawlState::Pausing { next },
            None => CrawlState::Done,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CrawlState::FetchingPage(_) => "fetching_page",
            CrawlState::ExtractingItems { .. } => "extracting_items",
            CrawlState::Pausing { .. } => "pausing",
            CrawlState::Done => "done",
        }
    }
}
