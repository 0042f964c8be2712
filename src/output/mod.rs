pub mod config;
pub mod csv;
pub mod json;
pub mod text;
pub mod types;

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::archive::types::WorkRecord;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;
pub use self::text::TextSink;

/// Where scraped records go. Written sequentially from the crawl loop.
pub trait RecordSink {
    fn write(&mut self, rec: &WorkRecord) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[value(name = "csv")] Csv,
    #[value(name = "json")] Json,
    #[value(name = "text")] Text,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl std::fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "stdout"),
            OutputTarget::File(p) => write!(f, "{}", p.display()),
        }
    }
}

/// `output/Warrior Nun (TV)_2024-10-12.csv`
pub fn default_csv_path(tag: &str, today: NaiveDate) -> PathBuf {
    let safe: String = tag
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect();
    PathBuf::from("output").join(format!("{}_{}.csv", safe, today.format("%Y-%m-%d")))
}

/// `-` means stdout; no value means a dated CSV file for csv, stdout otherwise.
pub fn resolve_target(format: OutputFormat, output: Option<&str>, tag: &str, today: NaiveDate) -> OutputTarget {
    match output {
        Some("-") => OutputTarget::Stdout,
        Some(path) => OutputTarget::File(PathBuf::from(path)),
        None if format == OutputFormat::Csv => OutputTarget::File(default_csv_path(tag, today)),
        None => OutputTarget::Stdout,
    }
}

pub fn open_sink(format: OutputFormat, target: &OutputTarget, pretty: bool) -> Result<Box<dyn RecordSink>> {
    let writer: Box<dyn io::Write> = match target {
        OutputTarget::Stdout => Box::new(io::stdout()),
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
            }
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
    };
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvSink::new(writer)?),
        OutputFormat::Json => Box::new(JsonSink::new(writer, pretty)),
        OutputFormat::Text => Box::new(TextSink::new(writer)),
    })
}

#[cfg(test)]
#[derive(Default)]
pub struct VecSink {
    pub records: Vec<WorkRecord>,
    pub finished: bool,
}

#[cfg(test)]
impl RecordSink for VecSink {
    fn write(&mut self, rec: &WorkRecord) -> Result<()> {
        self.records.push(rec.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
pub fn test_record(id: &str) -> WorkRecord {
    use crate::archive::types::{Byline, ChapterTotal, Stats, Symbols, Tags, WorkDate};

    let updated = WorkDate::new(NaiveDate::from_ymd_opt(2020, 7, 2).unwrap(), "02 Jul 2020");
    WorkRecord::assemble(
        id.to_string(),
        vec!["Warrior Nun (TV)".into()],
        Byline { title: "My Title".into(), author: "SomeAuthor".into() },
        Tags { relationships: vec!["Ava Silva/Beatrice".into()], characters: vec!["Ava Silva".into()], freeforms: vec![] },
        Symbols {
            rating: "Teen And Up Audiences".into(),
            warnings: vec!["No Archive Warnings Apply".into()],
            category: "F/F".into(),
            completion: "Complete Work".into(),
        },
        Stats {
            language: Some("English".into()),
            word_count: 1234,
            chapter_count: 1,
            chapter_total: ChapterTotal::Known(1),
            kudos: None,
            comments: None,
            bookmarks: None,
            hits: None,
        },
        updated.clone(),
        Some(updated),
    )
}
