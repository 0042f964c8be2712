use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use scraper::Html;
use serde::Serialize;
use tracing::Instrument;

use crate::archive::{DetailPolicy, DetailSource, HttpConfig, HttpFetcher};
use crate::archive::detail::DEFAULT_DETAIL_DELAY_MS;
use crate::archive::extract::{extract_record, work_fragments};
use crate::output::{self, OutputFormat, OutputTarget, RecordSink};
use crate::telemetry::{self};
use crate::telemetry::ops::extract::Phase as ExtractPhase;

/// fandom extract <saved listing page>
#[derive(Args)]
pub struct ExtractCmd {
    pub file: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)] pub format: OutputFormat,
    /// Output file; defaults to stdout
    #[arg(short, long)] pub output: Option<PathBuf>,
    /// Fetch work pages for multi-chapter publish dates
    #[arg(long, default_value_t = false)] pub fetch_details: bool,
    #[arg(long, default_value_t = DEFAULT_DETAIL_DELAY_MS)] pub detail_delay_ms: u64,
}

#[derive(Debug, Default, Serialize)]
pub struct ExtractSummary {
    pub fragments: usize,
    pub records: usize,
    pub errors: Vec<String>,
}

pub async fn run(args: ExtractCmd) -> Result<()> {
    let log = telemetry::extract();
    let _g = log.root_span_kv([
        ("file", args.file.display().to_string()),
        ("fetch_details", args.fetch_details.to_string()),
    ]).entered();

    let html = {
        let _s = log.span(&ExtractPhase::ReadFile).entered();
        std::fs::read_to_string(&args.file).with_context(|| format!("read {}", args.file.display()))?
    };

    let http = HttpConfig::from_env();
    let fetcher = HttpFetcher::new(&http).context("build http client")?;
    let policy = if args.fetch_details {
        DetailPolicy { delay: Duration::from_millis(args.detail_delay_ms), ..DetailPolicy::default() }
    } else {
        DetailPolicy::disabled()
    };

    let target = args.output.map(OutputTarget::File).unwrap_or(OutputTarget::Stdout);
    let pretty = output::config::OutputConfig::from_env().pretty;
    let mut sink = output::open_sink(args.format, &target, pretty)?;

    let t0 = Instant::now();
    let detail = DetailSource::new(&fetcher, &http.base_url, &policy)
        .with_span(|| telemetry::extract().span(&ExtractPhase::FetchDetail));
    let summary = extract_page(&html, detail, sink.as_mut()).await?;
    log.info(format!("✅ {} record(s) from {} work(s), {} skipped", summary.records, summary.fragments, summary.errors.len()));
    for e in &summary.errors { log.warn(format!("↩️ {}", e)); }

    if telemetry::config::json_mode() {
        log.result(&summary, t0.elapsed())?;
    }
    Ok(())
}

/// Extract every work of one listing page into `sink`, isolating failures per work.
pub async fn extract_page(html: &str, detail: DetailSource<'_>, sink: &mut dyn RecordSink) -> Result<ExtractSummary> {
    let log = telemetry::extract();
    let doc = Html::parse_document(html);
    let fragments = work_fragments(&doc);
    let mut summary = ExtractSummary { fragments: fragments.len(), ..ExtractSummary::default() };

    for fragment in fragments {
        match extract_record(fragment, detail).instrument(log.span(&ExtractPhase::Extract)).await {
            Ok(rec) => {
                let _w = log.span(&ExtractPhase::Write).entered();
                sink.write(&rec)?;
                summary.records += 1;
            }
            Err(e) => summary.errors.push(e.to_string()),
        }
    }
    sink.finish()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::extract::fixtures::{listing_page, Blurb};
    use crate::archive::fetch::StubFetcher;
    use crate::archive::urls::DEFAULT_BASE_URL;
    use crate::output::VecSink;

    #[tokio::test]
    async fn saved_page_without_details() {
        let html = listing_page(&[
            Blurb { id: "1", ..Blurb::default() }.html(),
            Blurb { id: "2", chapters: "3/?", ..Blurb::default() }.html(),
            Blurb { id: "3", date: "02 Foo 2020", ..Blurb::default() }.html(),
        ]);
        let stub = StubFetcher::new();
        let policy = DetailPolicy::disabled();
        let mut sink = VecSink::default();

        let summary = extract_page(&html, DetailSource::new(&stub, DEFAULT_BASE_URL, &policy), &mut sink).await.unwrap();
        assert_eq!(summary.fragments, 3);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("work 3:"));
        assert!(sink.records[1].published.is_none());
        assert!(stub.calls().is_empty());
        assert!(sink.finished);
    }

    #[tokio::test]
    async fn page_without_works_yields_nothing() {
        let stub = StubFetcher::new();
        let policy = DetailPolicy::disabled();
        let mut sink = VecSink::default();
        let summary = extract_page("<html><body><p>No results found.</p></body></html>", DetailSource::new(&stub, DEFAULT_BASE_URL, &policy), &mut sink)
            .await
            .unwrap();
        assert_eq!(summary.fragments, 0);
        assert!(sink.records.is_empty());
    }
}
