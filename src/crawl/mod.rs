pub mod config;
pub mod engine;
pub mod pace;
pub mod range;
pub mod state;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;

use crate::archive::{DetailPolicy, HttpConfig, HttpFetcher, Rating};
use crate::archive::detail::DEFAULT_DETAIL_DELAY_MS;
use crate::output::{self, OutputFormat};
use crate::telemetry::{self};
use crate::telemetry::ops::crawl::Phase as CrawlPhase;

use self::config::{CrawlConfig, DEFAULT_PAUSE_SECS};
use self::engine::Crawler;
use self::range::PageRange;

#[derive(Args)]
pub struct CrawlCmd {
    /// Tag whose works are listed, e.g. "Warrior Nun (TV)"
    #[arg(long, env = "FANDOM_TAG")] pub tag: String,
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))] pub start: u32,
    /// Last page (inclusive); below --start walks backwards
    #[arg(long, conflicts_with = "pages", value_parser = clap::value_parser!(u32).range(1..))] pub end: Option<u32>,
    /// Number of pages from --start (default 30)
    #[arg(long)] pub pages: Option<u32>,
    /// Seconds slept between listing pages
    #[arg(long, default_value_t = DEFAULT_PAUSE_SECS)] pub pause_secs: u64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)] pub format: OutputFormat,
    /// Output file; `-` for stdout. CSV defaults to output/<tag>_<date>.csv
    #[arg(short, long)] pub output: Option<String>,
    #[arg(long, default_value_t = DEFAULT_DETAIL_DELAY_MS)] pub detail_delay_ms: u64,
    /// Never fetch work pages; multi-chapter works get no publish date
    #[arg(long, default_value_t = false)] pub no_details: bool,
    /// Skip the work page fetch for this rating (repeatable)
    #[arg(long = "skip-detail-rating", value_enum)] pub skip_detail_ratings: Vec<Rating>,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

impl CrawlCmd {
    pub fn into_config(self, http: HttpConfig, pretty: bool) -> Result<CrawlConfig> {
        let range = PageRange::from_args(self.start, self.end, self.pages)?;
        let today = chrono::Local::now().date_naive();
        let target = output::resolve_target(self.format, self.output.as_deref(), &self.tag, today);
        let detail = DetailPolicy {
            enabled: !self.no_details,
            delay: Duration::from_millis(self.detail_delay_ms),
            skip_ratings: self.skip_detail_ratings,
        };
        Ok(CrawlConfig {
            tag: self.tag,
            range,
            pause: Duration::from_secs(self.pause_secs),
            format: self.format,
            target,
            pretty,
            detail,
            http,
        })
    }
}

pub async fn run(args: CrawlCmd) -> Result<()> {
    let log = telemetry::crawl();
    let plan_limit = args.plan_limit;
    let apply = args.apply;
    let cfg = args.into_config(HttpConfig::from_env(), output::config::OutputConfig::from_env().pretty)?;

    let _g = log.root_span_kv([
        ("apply", apply.to_string()),
        ("tag", cfg.tag.clone()),
        ("start", cfg.range.start.to_string()),
        ("end", cfg.range.end.to_string()),
        ("pause_secs", cfg.pause.as_secs().to_string()),
        ("output", cfg.target.to_string()),
    ]).entered();

    if !apply {
        let _s = log.span(&CrawlPhase::Plan).entered();
        let plan = cfg.plan(plan_limit);
        log.info(format!(
            "📝 Crawl plan — tag={:?} pages={}..={} ({}) pause={}s output={} details={}",
            plan.tag, plan.start, plan.end, plan.pages, plan.pause_secs, plan.output, plan.detail_fetch
        ));
        for u in &plan.sample_urls { log.info(format!("  {}", u)); }
        if plan.pages as usize > plan_limit { log.info(format!("  ... ({} more)", plan.pages as usize - plan_limit)); }
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&plan)?;
        }
        return Ok(());
    }

    let fetcher = HttpFetcher::new(&cfg.http).context("build http client")?;
    let mut sink = output::open_sink(cfg.format, &cfg.target, cfg.pretty)?;

    let t0 = Instant::now();
    let summary = Crawler::new(&cfg, &fetcher).run(sink.as_mut()).await?;
    log.info(format!("Wrote {} record(s) to {} in {:.1}s", summary.records, cfg.target, t0.elapsed().as_secs_f32()));

    if telemetry::config::json_mode() {
        log.result(&summary, t0.elapsed())?;
    }
    Ok(())
}
