use std::io::Write;

use anyhow::Result;

use super::RecordSink;
use crate::archive::types::{WorkDate, WorkRecord};

pub const SHIP_SLOTS: usize = 3;
pub const CHAR_SLOTS: usize = 4;

pub const HEADER: [&str; 25] = [
    "ID", "Crossover", "Title", "Author",
    "Ship_1", "Ship_2", "Ship_3",
    "Char_1", "Char_2", "Char_3", "Char_4",
    "Rating", "Category", "Warnings", "Completion", "Language",
    "Words", "Chapters", "Chapters_Total",
    "Published_Year", "Published_Month", "Published_Day",
    "Updated_Year", "Updated_Month", "Updated_Day",
];

/// Fixed-width slots; overflow dropped, missing slots empty.
fn slots(values: &[String], n: usize) -> impl Iterator<Item = String> + '_ {
    (0..n).map(move |i| values.get(i).cloned().unwrap_or_default())
}

fn date_cells(date: Option<&WorkDate>) -> [String; 3] {
    match date {
        Some(d) => [d.year().to_string(), d.month().to_string(), d.day().to_string()],
        None => Default::default(),
    }
}

pub fn row(rec: &WorkRecord) -> Vec<String> {
    let mut row = Vec::with_capacity(HEADER.len());
    row.push(rec.id.clone());
    row.push(if rec.crossover { "True" } else { "False" }.to_string());
    row.push(rec.title.clone());
    row.push(rec.author.clone());
    row.extend(slots(&rec.relationships, SHIP_SLOTS));
    row.extend(slots(&rec.characters, CHAR_SLOTS));
    row.push(rec.rating.clone());
    row.push(rec.category.clone());
    row.push(rec.warnings.join(", "));
    row.push(rec.completion.clone());
    row.push(rec.language.clone().unwrap_or_default());
    row.push(rec.word_count.to_string());
    row.push(rec.chapter_count.to_string());
    row.push(rec.chapter_total.as_text());
    row.extend(date_cells(rec.published.as_ref()));
    row.extend(date_cells(Some(&rec.updated)));
    row
}

pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(e) => panic!("csv flush failed: {e}"),
        }
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write(&mut self, rec: &WorkRecord) -> Result<()> {
        self.writer.write_record(row(rec))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
