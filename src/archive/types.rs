use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// A calendar date as the archive rendered it, plus the parsed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkDate {
    pub date: NaiveDate,
    pub text: String,
}

impl WorkDate {
    pub fn new(date: NaiveDate, text: impl Into<String>) -> Self {
        Self { date, text: text.into() }
    }

    pub fn year(&self) -> i32 { self.date.year() }
    pub fn month(&self) -> u32 { self.date.month() }
    pub fn day(&self) -> u32 { self.date.day() }
}

/// Title and author from the work header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Byline {
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tags {
    pub relationships: Vec<String>,
    pub characters: Vec<String>,
    pub freeforms: Vec<String>,
}

/// The four "required tags" markers of a blurb.
///
/// The archive gives these no usable key; they are always rendered in the
/// order rating, warnings, category, completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbols {
    pub rating: String,
    pub warnings: Vec<String>,
    pub category: String,
    pub completion: String,
}

impl Symbols {
    pub fn rating_level(&self) -> Rating { Rating::from_label(&self.rating) }

    /// Build from the marker texts in document order. Order is load-bearing.
    pub fn from_positional(texts: &[String]) -> Option<Self> {
        let [rating, warnings, category, completion] = texts.get(..4)? else { return None };
        Some(Self {
            rating: rating.trim().to_string(),
            warnings: split_warnings(warnings),
            category: category.trim().to_string(),
            completion: completion.trim().to_string(),
        })
    }
}

fn split_warnings(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Chapter total as shown after the slash; the archive uses "?" while a
/// work is still in progress with no planned length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ChapterTotal {
    Known(u32),
    Unknown(String),
}

impl ChapterTotal {
    pub const UNKNOWN_MARKER: &'static str = "?";

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.replace(',', "").parse::<u32>() {
            Ok(n) => ChapterTotal::Known(n),
            Err(_) if raw.is_empty() => ChapterTotal::Unknown(Self::UNKNOWN_MARKER.to_string()),
            Err(_) => ChapterTotal::Unknown(raw.to_string()),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            ChapterTotal::Known(n) => n.to_string(),
            ChapterTotal::Unknown(s) => s.clone(),
        }
    }
}

impl From<ChapterTotal> for String {
    fn from(t: ChapterTotal) -> Self { t.as_text() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub language: Option<String>,
    pub word_count: u64,
    pub chapter_count: u32,
    pub chapter_total: ChapterTotal,
    pub kudos: Option<u32>,
    pub comments: Option<u32>,
    pub bookmarks: Option<u32>,
    pub hits: Option<u32>,
}

/// Coarse rating level, used for policy decisions only. The record keeps
/// the rating text exactly as rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    #[value(name = "general")] General,
    #[value(name = "teen")] Teen,
    #[value(name = "mature")] Mature,
    #[value(name = "explicit")] Explicit,
    #[value(name = "not-rated")] NotRated,
    #[value(skip)] Unknown,
}

impl Rating {
    pub fn from_label(label: &str) -> Self {
        let l = label.trim().to_ascii_lowercase();
        if l.starts_with("general") { Rating::General }
        else if l.starts_with("teen") { Rating::Teen }
        else if l.starts_with("mature") { Rating::Mature }
        else if l.starts_with("explicit") { Rating::Explicit }
        else if l.starts_with("not rated") { Rating::NotRated }
        else { Rating::Unknown }
    }
}

/// One scraped work. Built once by the extractor and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub fandoms: Vec<String>,
    pub crossover: bool,
    pub relationships: Vec<String>,
    pub characters: Vec<String>,
    pub freeforms: Vec<String>,
    pub rating: String,
    pub warnings: Vec<String>,
    pub category: String,
    pub completion: String,
    pub language: Option<String>,
    pub word_count: u64,
    pub chapter_count: u32,
    pub chapter_total: ChapterTotal,
    pub kudos: Option<u32>,
    pub comments: Option<u32>,
    pub bookmarks: Option<u32>,
    pub hits: Option<u32>,
    pub published: Option<WorkDate>,
    pub updated: WorkDate,
}

impl WorkRecord {
    pub fn assemble(
        id: String,
        fandoms: Vec<String>,
        byline: Byline,
        tags: Tags,
        symbols: Symbols,
        stats: Stats,
        updated: WorkDate,
        published: Option<WorkDate>,
    ) -> Self {
        let crossover = fandoms.len() > 1;
        WorkRecord {
            id,
            title: byline.title,
            author: byline.author,
            fandoms,
            crossover,
            relationships: tags.relationships,
            characters: tags.characters,
            freeforms: tags.freeforms,
            rating: symbols.rating,
            warnings: symbols.warnings,
            category: symbols.category,
            completion: symbols.completion,
            language: stats.language,
            word_count: stats.word_count,
            chapter_count: stats.chapter_count,
            chapter_total: stats.chapter_total,
            kudos: stats.kudos,
            comments: stats.comments,
            bookmarks: stats.bookmarks,
            hits: stats.hits,
            published,
            updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_keep_document_order() {
        let texts: Vec<String> = ["Explicit", "Graphic Depictions Of Violence, Major Character Death", "F/F", "Work in Progress"]
            .iter().map(|s| s.to_string()).collect();
        let s = Symbols::from_positional(&texts).unwrap();
        assert_eq!(s.rating, "Explicit");
        assert_eq!(s.warnings, vec!["Graphic Depictions Of Violence", "Major Character Death"]);
        assert_eq!(s.category, "F/F");
        assert_eq!(s.completion, "Work in Progress");
    }

    #[test]
    fn symbols_need_four_markers() {
        let texts: Vec<String> = vec!["Mature".into(), "No Archive Warnings Apply".into()];
        assert!(Symbols::from_positional(&texts).is_none());
    }

    #[test]
    fn chapter_total_keeps_unknown_marker() {
        assert_eq!(ChapterTotal::parse("12"), ChapterTotal::Known(12));
        assert_eq!(ChapterTotal::parse("?").as_text(), "?");
        assert_eq!(ChapterTotal::parse("1,200"), ChapterTotal::Known(1200));
    }

    #[test]
    fn rating_levels_from_labels() {
        assert_eq!(Rating::from_label("Teen And Up Audiences"), Rating::Teen);
        assert_eq!(Rating::from_label("Teen And Up"), Rating::Teen);
        assert_eq!(Rating::from_label("General Audiences"), Rating::General);
        assert_eq!(Rating::from_label("Not Rated"), Rating::NotRated);
        assert_eq!(Rating::from_label("???"), Rating::Unknown);
    }
}
