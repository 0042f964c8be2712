use std::io::Write;

use anyhow::Result;

use super::RecordSink;
use crate::archive::types::WorkRecord;

/// One JSON object per line.
pub struct JsonSink<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W, pretty: bool) -> Self { Self { out, pretty } }

    #[cfg(test)]
    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn write(&mut self, rec: &WorkRecord) -> Result<()> {
        if self.pretty { serde_json::to_writer_pretty(&mut self.out, rec)?; } else { serde_json::to_writer(&mut self.out, rec)?; }
        writeln!(self.out)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
