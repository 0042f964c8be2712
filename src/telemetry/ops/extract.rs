use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Extract;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadFile, Extract, FetchDetail, Write }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ReadFile => "read_file",
        Phase::Extract => "extract",
        Phase::FetchDetail => "fetch_detail",
        Phase::Write => "write",
    }}
    fn span(&self) -> Span { match self {
        Phase::ReadFile => info_span!("read_file"),
        Phase::Extract => info_span!("extract"),
        Phase::FetchDetail => info_span!("fetch_detail"),
        Phase::Write => info_span!("write"),
    }}
}

impl OpMarker for Extract {
    const NAME: &'static str = "extract";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("extract") }
}
