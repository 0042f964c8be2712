use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{info, debug, warn, Span};

use super::emit;
use crate::output::types::Meta;
use super::ops::crawl::Crawl;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        if self.json {
            let details = kv_to_string(fields);
            if !details.is_empty() { debug!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start"); }
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn debug(&self, msg: impl AsRef<str>) { if self.json { debug!(op = %self.op_name(), "{}", msg.as_ref()); } else { debug!("{}", msg.as_ref()); } }
    pub fn warn(&self, msg: impl AsRef<str>) { if self.json { warn!(op = %self.op_name(), "{}", msg.as_ref()); } else { warn!("{}", msg.as_ref()); } }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{} {}", msg, details); }
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> { emit::print_plan(O::NAME, plan, None) }
    pub fn result<T: Serialize>(&self, result: &T, elapsed: Duration) -> Result<()> {
        emit::print_result(O::NAME, result, Some(Meta { duration_ms: Some(elapsed.as_millis()) }))
    }
}

impl LogCtx<Crawl> {
    pub fn page_summary(&self, page: u32, records: usize, errors: usize) {
        if self.json { info!(op = %self.op_name(), page, records, errors, "page_summary"); }
        else { info!("✅ Page {} — records={} errors={}", page, records, errors); }
    }

    pub fn totals(&self, pages: usize, records: usize, item_errors: usize, page_errors: usize) {
        if self.json { info!(op = %self.op_name(), pages, records, item_errors, page_errors, "crawl_totals"); }
        else { info!("📊 Crawl totals — pages={} records={} item_errors={} page_errors={}", pages, records, item_errors, page_errors); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}
