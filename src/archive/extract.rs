// Blurb extraction: one `li.work.blurb` fragment of a listing page -> WorkRecord.

use scraper::{ElementRef, Html, Selector};

use super::date::parse_listing_date;
use super::detail::DetailSource;
use super::error::{ExtractError, ExtractErrorKind};
use super::types::{Byline, ChapterTotal, Stats, Symbols, Tags, WorkDate, WorkRecord};

const FRAGMENT_SELECTOR: &str = "li.work.blurb";

fn select_first<'a>(el: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(css).ok()?;
    el.select(&sel).next()
}

fn select_all<'a>(el: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => el.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Non-empty, trimmed text nodes in document order.
fn stripped_strings(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}

/// All work fragments on a parsed listing page, in page order.
pub fn work_fragments(doc: &Html) -> Vec<ElementRef<'_>> {
    match Selector::parse(FRAGMENT_SELECTOR) {
        Ok(sel) => doc.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

/// `id="work_24812345"` -> `"24812345"`.
pub fn extract_id(fragment: ElementRef<'_>) -> Result<String, ExtractError> {
    let raw = fragment.value().attr("id").ok_or_else(|| ExtractError::malformed("id attribute"))?;
    let id = raw.rsplit('_').next().unwrap_or_default();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ExtractError::malformed("id attribute"));
    }
    Ok(id.to_string())
}

pub fn extract_fandoms(fragment: ElementRef<'_>) -> Vec<String> {
    select_all(fragment, "h5.fandoms a.tag")
        .into_iter()
        .map(text_of)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Title is the first text node of the header. Authors come from the
/// `rel="author"` links, joined with ", " for co-authored works; gift
/// recipients follow them and are not authors.
///
/// Anonymous works render "by Anonymous" as plain text with no link, so
/// then the last text node is used, minus a leading "by ".
pub fn extract_byline(fragment: ElementRef<'_>) -> Result<Byline, ExtractError> {
    let heading = select_first(fragment, "div.header.module h4")
        .ok_or_else(|| ExtractError::malformed("byline heading"))?;
    let parts = stripped_strings(heading);
    let title = parts.first().cloned().ok_or_else(|| ExtractError::malformed("title"))?;

    let linked: Vec<String> = select_all(heading, r#"a[rel="author"]"#)
        .into_iter()
        .map(text_of)
        .filter(|s| !s.is_empty())
        .collect();
    if !linked.is_empty() {
        return Ok(Byline { title, author: linked.join(", ") });
    }

    let author = parts
        .iter()
        .skip(1)
        .rev()
        .map(|s| s.strip_prefix("by ").unwrap_or(s).trim())
        .find(|s| !s.is_empty() && *s != "by" && *s != ",")
        .ok_or_else(|| ExtractError::malformed("author"))?;

    Ok(Byline { title, author: author.to_string() })
}

pub fn extract_tags(fragment: ElementRef<'_>) -> Tags {
    let Some(list) = select_first(fragment, "ul.tags.commas") else { return Tags::default() };
    let by_class = |class: &str| -> Vec<String> {
        select_all(list, &format!("li.{class}"))
            .into_iter()
            .map(text_of)
            .filter(|s| !s.is_empty())
            .collect()
    };
    Tags {
        relationships: by_class("relationships"),
        characters: by_class("characters"),
        freeforms: by_class("freeforms"),
    }
}

/// The four `title="Symbols key"` markers, read strictly by position.
pub fn extract_symbols(fragment: ElementRef<'_>) -> Result<Symbols, ExtractError> {
    let texts: Vec<String> = select_all(fragment, r#"[title="Symbols key"]"#)
        .into_iter()
        .map(text_of)
        .collect();
    Symbols::from_positional(&texts).ok_or_else(|| ExtractError::malformed("symbols"))
}

fn parse_count(raw: &str) -> Option<u32> {
    raw.trim().replace(',', "").parse().ok()
}

/// Label/value pairs of `dl.stats`. Word counts that are not numbers become 0
/// (the archive sometimes renders a placeholder there).
pub fn extract_stats(fragment: ElementRef<'_>) -> Result<Stats, ExtractError> {
    let dl = select_first(fragment, "dl.stats").ok_or_else(|| ExtractError::malformed("dl.stats"))?;
    let labels = select_all(dl, "dt").into_iter().map(text_of);
    let values = select_all(dl, "dd").into_iter().map(text_of);
    let pairs: Vec<(String, String)> = labels
        .zip(values)
        .map(|(k, v)| (k.strip_suffix(':').unwrap_or(&k).trim().to_string(), v))
        .collect();
    let get = |label: &str| pairs.iter().find(|(k, _)| k == label).map(|(_, v)| v.as_str());

    let chapters = get("Chapters").ok_or_else(|| ExtractError::malformed("chapters"))?;
    let (done, total) = chapters.split_once('/').unwrap_or((chapters, ChapterTotal::UNKNOWN_MARKER));
    let chapter_count = parse_count(done).ok_or_else(|| ExtractError::malformed("chapters"))?;

    let words = get("Words").ok_or_else(|| ExtractError::malformed("words"))?;
    let word_count = words.trim().replace(',', "").parse::<u64>().unwrap_or(0);

    Ok(Stats {
        language: get("Language").map(str::to_string).filter(|s| !s.is_empty()),
        word_count,
        chapter_count,
        chapter_total: ChapterTotal::parse(total),
        kudos: get("Kudos").and_then(parse_count),
        comments: get("Comments").and_then(parse_count),
        bookmarks: get("Bookmarks").and_then(parse_count),
        hits: get("Hits").and_then(parse_count),
    })
}

/// Date shown on the blurb: last update for multi-chapter works.
pub fn extract_updated(fragment: ElementRef<'_>) -> Result<WorkDate, ExtractError> {
    let p = select_first(fragment, "p.datetime").ok_or_else(|| ExtractError::malformed("p.datetime"))?;
    parse_listing_date(&text_of(p))
}

/// Original publish date. Single-chapter works were published on the
/// blurb date; others need their work page, subject to the detail policy.
pub async fn extract_published(
    fragment: ElementRef<'_>,
    detail: DetailSource<'_>,
) -> Result<Option<WorkDate>, ExtractError> {
    let stats = extract_stats(fragment)?;
    let updated = extract_updated(fragment)?;
    if stats.chapter_count <= 1 {
        return Ok(Some(updated));
    }

    let symbols = extract_symbols(fragment)?;
    if !detail.policy.should_fetch(symbols.rating_level()) {
        return Ok(None);
    }

    let id = extract_id(fragment)?;
    let published = detail.fetch_published(&id).await?;
    if published.date > updated.date {
        return Err(ExtractError::new(Some(id), ExtractErrorKind::MalformedFragment("published date after updated date")));
    }
    Ok(Some(published))
}

pub async fn extract_record(
    fragment: ElementRef<'_>,
    detail: DetailSource<'_>,
) -> Result<WorkRecord, ExtractError> {
    let id = extract_id(fragment)?;
    let tagged = |e: ExtractError| e.for_work(&id);

    let byline = extract_byline(fragment).map_err(tagged)?;
    let tags = extract_tags(fragment);
    let symbols = extract_symbols(fragment).map_err(tagged)?;
    let stats = extract_stats(fragment).map_err(tagged)?;
    let updated = extract_updated(fragment).map_err(tagged)?;
    let published = extract_published(fragment, detail).await.map_err(tagged)?;

    Ok(WorkRecord::assemble(id.clone(), extract_fandoms(fragment), byline, tags, symbols, stats, updated, published))
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A listing blurb shaped like the archive's markup.
    pub struct Blurb<'a> {
        pub id: &'a str,
        pub title: &'a str,
        pub author: &'a str,
        pub fandoms: &'a [&'a str],
        pub relationships: &'a [&'a str],
        pub characters: &'a [&'a str],
        pub symbols: [&'a str; 4],
        pub chapters: &'a str,
        pub words: &'a str,
        pub date: &'a str,
    }

    impl Default for Blurb<'_> {
        fn default() -> Self {
            Blurb {
                id: "1001",
                title: "My Title",
                author: "SomeAuthor",
                fandoms: &["Warrior Nun (TV)"],
                relationships: &["Ava Silva/Beatrice"],
                characters: &["Ava Silva", "Beatrice"],
                symbols: ["Teen And Up", "No Archive Warnings Apply", "M/M", "Complete Work"],
                chapters: "1/1",
                words: "1,234",
                date: "02 Jul 2020",
            }
        }
    }

    impl Blurb<'_> {
        pub fn html(&self) -> String {
            let fandoms: String = self.fandoms.iter().map(|f| format!(r#"<a class="tag" href="/tags/x/works">{f}</a>, "#)).collect();
            let ships: String = self.relationships.iter().map(|r| format!(r#"<li class="relationships"><a class="tag">{r}</a></li>"#)).collect();
            let chars: String = self.characters.iter().map(|c| format!(r#"<li class="characters"><a class="tag">{c}</a></li>"#)).collect();
            let symbols: String = self.symbols.iter().map(|s| format!(
                r#"<li><a class="help symbol question modal" title="Symbols key"><span class="text">{s}</span></a></li>"#
            )).collect();
            format!(
                r#"<li id="work_{id}" class="work blurb group work-{id}" role="article">
  <div class="header module">
    <h4 class="heading">
      <a href="/works/{id}">{title}</a>
      by
      <a rel="author" href="/users/{author}/pseuds/{author}">{author}</a>
    </h4>
    <h5 class="fandoms heading"><span class="landmark">Fandoms:</span> {fandoms}</h5>
    <ul class="required-tags">{symbols}</ul>
    <p class="datetime">{date}</p>
  </div>
  <h6 class="landmark heading">Tags</h6>
  <ul class="tags commas">
    <li class="warnings"><strong><a class="tag">No Archive Warnings Apply</a></strong></li>
    {ships}{chars}
    <li class="freeforms"><a class="tag">Fluff</a></li>
  </ul>
  <dl class="stats">
    <dt class="language">Language:</dt><dd class="language">English</dd>
    <dt class="words">Words:</dt><dd class="words">{words}</dd>
    <dt class="chapters">Chapters:</dt><dd class="chapters">{chapters}</dd>
    <dt class="kudos">Kudos:</dt><dd class="kudos"><a href="/works/{id}#kudos">1,050</a></dd>
    <dt class="hits">Hits:</dt><dd class="hits">20,311</dd>
  </dl>
</li>"#,
                id = self.id, title = self.title, author = self.author, date = self.date,
                words = self.words, chapters = self.chapters,
            )
        }
    }

    pub fn listing_page(blurbs: &[String]) -> String {
        format!(
            r#"<html><body><div id="main"><ol class="work index group">{}</ol></div></body></html>"#,
            blurbs.concat()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::fixtures::{listing_page, Blurb};
    use super::*;
    use crate::archive::detail::DetailPolicy;
    use crate::archive::types::Rating;
    use crate::archive::fetch::StubFetcher;
    use crate::archive::urls::{detail_url, DEFAULT_BASE_URL};

    fn no_delay() -> DetailPolicy { DetailPolicy { delay: Duration::ZERO, ..DetailPolicy::default() } }

    fn with_fragment<T>(html: &str, f: impl FnOnce(ElementRef<'_>) -> T) -> T {
        let doc = Html::parse_document(&listing_page(&[html.to_string()]));
        let frags = work_fragments(&doc);
        assert_eq!(frags.len(), 1);
        f(frags[0])
    }

    #[tokio::test]
    async fn end_to_end_single_chapter_record() {
        let html = listing_page(&[Blurb::default().html()]);
        let doc = Html::parse_document(&html);
        let stub = StubFetcher::new();
        let policy = no_delay();
        let detail = DetailSource::new(&stub, DEFAULT_BASE_URL, &policy);

        let rec = extract_record(work_fragments(&doc)[0], detail).await.unwrap();
        assert_eq!(rec.id, "1001");
        assert_eq!(rec.title, "My Title");
        assert_eq!(rec.author, "SomeAuthor");
        assert_eq!(rec.rating, "Teen And Up");
        assert_eq!(rec.warnings, vec!["No Archive Warnings Apply"]);
        assert_eq!(rec.category, "M/M");
        assert_eq!(rec.completion, "Complete Work");
        assert_eq!(rec.word_count, 1234);
        assert_eq!(rec.chapter_count, 1);
        assert_eq!(rec.chapter_total.as_text(), "1");
        assert_eq!(rec.language.as_deref(), Some("English"));
        assert_eq!(rec.kudos, Some(1050));
        assert_eq!(rec.hits, Some(20311));
        assert_eq!(rec.comments, None);
        assert_eq!(rec.freeforms, vec!["Fluff"]);
        assert!(!rec.crossover);
        assert_eq!(rec.published.as_ref(), Some(&rec.updated));
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn extraction_is_deterministic() {
        let html = listing_page(&[Blurb::default().html()]);
        let stub = StubFetcher::new();
        let policy = no_delay();
        let detail = DetailSource::new(&stub, DEFAULT_BASE_URL, &policy);
        let a = { let doc = Html::parse_document(&html); extract_record(work_fragments(&doc)[0], detail).await.unwrap() };
        let b = { let doc = Html::parse_document(&html); extract_record(work_fragments(&doc)[0], detail).await.unwrap() };
        assert_eq!(a, b);
    }

    #[test]
    fn crossover_follows_fandom_count() {
        let blurb = Blurb { fandoms: &["Warrior Nun (TV)", "Good Omens (TV)"], ..Blurb::default() };
        let fandoms = with_fragment(&blurb.html(), extract_fandoms);
        assert_eq!(fandoms, vec!["Warrior Nun (TV)", "Good Omens (TV)"]);
    }

    #[test]
    fn missing_id_is_malformed() {
        let html = Blurb::default().html().replace(r#"id="work_1001""#, "");
        let err = with_fragment(&html, extract_id).unwrap_err();
        assert!(matches!(err.kind, ExtractErrorKind::MalformedFragment("id attribute")));
        assert!(err.work_id.is_none());
    }

    #[test]
    fn anonymous_byline_is_tolerated() {
        let html = Blurb::default().html().replace(
            r#"<a rel="author" href="/users/SomeAuthor/pseuds/SomeAuthor">SomeAuthor</a>"#,
            "Anonymous",
        );
        let b = with_fragment(&html, extract_byline).unwrap();
        assert_eq!(b.title, "My Title");
        assert_eq!(b.author, "Anonymous");
    }

    #[test]
    fn gift_recipient_is_not_the_author() {
        let html = Blurb::default().html().replace(
            "</h4>",
            r#" for <a href="/users/Giftee/gifts">Giftee</a></h4>"#,
        );
        let b = with_fragment(&html, extract_byline).unwrap();
        assert_eq!(b.title, "My Title");
        assert_eq!(b.author, "SomeAuthor");
    }

    #[test]
    fn co_authors_are_joined() {
        let html = Blurb::default().html().replace(
            "SomeAuthor</a>",
            r#"SomeAuthor</a>, <a rel="author" href="/users/Other/pseuds/Other">Other</a>"#,
        );
        let b = with_fragment(&html, extract_byline).unwrap();
        assert_eq!(b.author, "SomeAuthor, Other");
    }

    #[test]
    fn byline_without_author_is_malformed() {
        let html = Blurb::default().html().replace(
            r#"by
      <a rel="author" href="/users/SomeAuthor/pseuds/SomeAuthor">SomeAuthor</a>"#,
            "",
        );
        assert!(with_fragment(&html, extract_byline).is_err());
    }

    #[test]
    fn tags_keep_order_per_category() {
        let blurb = Blurb {
            relationships: &["A/B", "C/D", "E/F", "G/H"],
            characters: &["A", "B"],
            ..Blurb::default()
        };
        let tags = with_fragment(&blurb.html(), extract_tags);
        assert_eq!(tags.relationships, vec!["A/B", "C/D", "E/F", "G/H"]);
        assert_eq!(tags.characters, vec!["A", "B"]);
        assert_eq!(tags.freeforms, vec!["Fluff"]);
    }

    #[test]
    fn placeholder_word_count_becomes_zero() {
        let blurb = Blurb { words: "&mdash;", ..Blurb::default() };
        let stats = with_fragment(&blurb.html(), extract_stats).unwrap();
        assert_eq!(stats.word_count, 0);
    }

    #[test]
    fn unknown_chapter_total_is_kept() {
        let blurb = Blurb { chapters: "3/?", ..Blurb::default() };
        let stats = with_fragment(&blurb.html(), extract_stats).unwrap();
        assert_eq!(stats.chapter_count, 3);
        assert_eq!(stats.chapter_total, ChapterTotal::Unknown("?".into()));
    }

    #[test]
    fn missing_symbols_are_malformed() {
        let html = Blurb::default().html().replace(r#"title="Symbols key""#, "");
        assert!(with_fragment(&html, extract_symbols).is_err());
    }

    #[tokio::test]
    async fn multi_chapter_reads_detail_page() {
        let blurb = Blurb { id: "77", chapters: "4/10", date: "15 Jan 2021", ..Blurb::default() };
        let html = listing_page(&[blurb.html()]);
        let doc = Html::parse_document(&html);
        let stub = StubFetcher::new().page(
            &detail_url(DEFAULT_BASE_URL, "77").unwrap(),
            r#"<dl><dd class="published">2020-07-02</dd></dl>"#,
        );
        let policy = no_delay();
        let detail = DetailSource::new(&stub, DEFAULT_BASE_URL, &policy);

        let rec = extract_record(work_fragments(&doc)[0], detail).await.unwrap();
        let published = rec.published.unwrap();
        assert_eq!(published.text, "2020-07-02");
        assert!(published.date <= rec.updated.date);
        assert_eq!(stub.calls().len(), 1);
    }

    #[tokio::test]
    async fn skipped_rating_leaves_published_unknown() {
        let blurb = Blurb {
            chapters: "2/2",
            symbols: ["Explicit", "No Archive Warnings Apply", "F/F", "Complete Work"],
            ..Blurb::default()
        };
        let html = listing_page(&[blurb.html()]);
        let doc = Html::parse_document(&html);
        let stub = StubFetcher::new();
        let policy = DetailPolicy { skip_ratings: vec![Rating::Explicit], ..no_delay() };
        let detail = DetailSource::new(&stub, DEFAULT_BASE_URL, &policy);

        let rec = extract_record(work_fragments(&doc)[0], detail).await.unwrap();
        assert!(rec.published.is_none());
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn published_after_updated_is_rejected() {
        let blurb = Blurb { id: "5", chapters: "2/3", date: "01 Jan 2020", ..Blurb::default() };
        let html = listing_page(&[blurb.html()]);
        let doc = Html::parse_document(&html);
        let stub = StubFetcher::new().page(
            &detail_url(DEFAULT_BASE_URL, "5").unwrap(),
            r#"<dd class="published">2020-06-01</dd>"#,
        );
        let policy = no_delay();
        let detail = DetailSource::new(&stub, DEFAULT_BASE_URL, &policy);

        let err = extract_record(work_fragments(&doc)[0], detail).await.unwrap_err();
        assert_eq!(err.work_id.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn bad_date_error_carries_work_id() {
        let blurb = Blurb { id: "9", date: "02 Xyz 2020", ..Blurb::default() };
        let html = listing_page(&[blurb.html()]);
        let doc = Html::parse_document(&html);
        let stub = StubFetcher::new();
        let policy = no_delay();
        let detail = DetailSource::new(&stub, DEFAULT_BASE_URL, &policy);

        let err = extract_record(work_fragments(&doc)[0], detail).await.unwrap_err();
        assert_eq!(err.work_id.as_deref(), Some("9"));
        assert!(matches!(err.kind, ExtractErrorKind::DateParse(_)));
    }
}
