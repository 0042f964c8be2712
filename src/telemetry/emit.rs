use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

use crate::output::config::OutputConfig;
use crate::output::types::{Envelope, Meta};

fn print_envelope(env: &Envelope) -> Result<()> {
    let cfg = OutputConfig::from_env();
    let mut out = io::stdout().lock();
    if cfg.pretty { serde_json::to_writer_pretty(&mut out, env)?; } else { serde_json::to_writer(&mut out, env)?; }
    writeln!(&mut out)?;
    out.flush()?;
    Ok(())
}

pub fn print_plan<T: Serialize>(op: &'static str, plan: &T, meta: Option<Meta>) -> Result<()> {
    print_envelope(&Envelope::plan(op, plan, meta)?)
}

pub fn print_result<T: Serialize>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<()> {
    print_envelope(&Envelope::result(op, result, meta)?)
}
