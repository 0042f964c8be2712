use std::io::Write;

use anyhow::Result;
use serde_json::Value;

use super::RecordSink;
use crate::archive::types::WorkRecord;

/// Indented key/value dump, nested objects one level deeper.
pub struct TextSink<W: Write> {
    out: W,
    indent: usize,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self { Self { out, indent: 2 } }

    #[cfg(test)]
    pub fn into_inner(self) -> W { self.out }

    fn dump(&mut self, map: &serde_json::Map<String, Value>, depth: usize) -> Result<()> {
        let indent = self.indent;
        let pad = move |d: usize| " ".repeat(indent * d);
        writeln!(self.out, "{}{{", pad(depth))?;
        for (key, value) in map {
            match value {
                Value::Object(inner) => {
                    writeln!(self.out, "{}{}:", pad(depth + 1), key)?;
                    self.dump(inner, depth + 1)?;
                }
                Value::String(s) => writeln!(self.out, "{}{}: {}", pad(depth + 1), key, s)?,
                Value::Null => writeln!(self.out, "{}{}: -", pad(depth + 1), key)?,
                other => writeln!(self.out, "{}{}: {}", pad(depth + 1), key, other)?,
            }
        }
        writeln!(self.out, "{}}}", pad(depth))?;
        Ok(())
    }
}

impl<W: Write> RecordSink for TextSink<W> {
    fn write(&mut self, rec: &WorkRecord) -> Result<()> {
        match serde_json::to_value(rec)? {
            Value::Object(map) => self.dump(&map, 0),
            other => { writeln!(self.out, "{other}")?; Ok(()) }
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
