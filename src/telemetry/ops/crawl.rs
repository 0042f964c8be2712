use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Crawl;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Page, FetchPage, ParsePage, Extract, FetchDetail, Write, Pause }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Page => "page",
        Phase::FetchPage => "fetch_page",
        Phase::ParsePage => "parse_page",
        Phase::Extract => "extract",
        Phase::FetchDetail => "fetch_detail",
        Phase::Write => "write",
        Phase::Pause => "pause",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Page => info_span!("page"),
        Phase::FetchPage => info_span!("fetch_page"),
        Phase::ParsePage => info_span!("parse_page"),
        Phase::Extract => info_span!("extract"),
        Phase::FetchDetail => info_span!("fetch_detail"),
        Phase::Write => info_span!("write"),
        Phase::Pause => info_span!("pause"),
    }}
}

impl OpMarker for Crawl {
    const NAME: &'static str = "crawl";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("crawl") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_fetch_has_its_own_phase() {
        assert_eq!(Phase::FetchDetail.name(), "fetch_detail");
        assert_eq!(Phase::FetchPage.name(), "fetch_page");
    }
}
