use anyhow::{anyhow, Result};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://archiveofourown.org";

// The archive escapes these inside tag names before they reach the path.
const TAG_ESCAPES: [(char, &str); 5] = [('/', "*s*"), ('&', "*a*"), ('.', "*d*"), ('?', "*q*"), ('#', "*h*")];

pub fn escape_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    for ch in tag.chars() {
        match TAG_ESCAPES.iter().find(|(c, _)| *c == ch) {
            Some((_, esc)) => out.push_str(esc),
            None => out.push(ch),
        }
    }
    out
}

fn join_segments(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| anyhow!("invalid base url {base}: {e}"))?;
    {
        let mut path = url.path_segments_mut().map_err(|_| anyhow!("base url cannot carry a path: {base}"))?;
        path.pop_if_empty();
        for s in segments { path.push(s); }
    }
    Ok(url)
}

/// Search results for one tag, e.g. `/tags/Warrior%20Nun%20(TV)/works?tos=yes&page=2`.
pub fn listing_url(base: &str, tag: &str, page: u32) -> Result<Url> {
    let escaped = escape_tag(tag);
    let mut url = join_segments(base, &["tags", &escaped, "works"])?;
    url.query_pairs_mut()
        .append_pair("tos", "yes")
        .append_pair("page", &page.to_string());
    Ok(url)
}

/// The work page carrying the original publish date.
pub fn detail_url(base: &str, work_id: &str) -> Result<Url> {
    let mut url = join_segments(base, &["works", work_id])?;
    url.query_pairs_mut().append_pair("view_adult", "true");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_encodes_tag_segment() {
        let u = listing_url(DEFAULT_BASE_URL, "Warrior Nun (TV)", 3).unwrap();
        assert_eq!(u.as_str(), "https://archiveofourown.org/tags/Warrior%20Nun%20(TV)/works?tos=yes&page=3");
    }

    #[test]
    fn listing_url_applies_tag_escapes() {
        let u = listing_url("https://archiveofourown.org/", "Ava Silva/Beatrice", 1).unwrap();
        assert_eq!(u.path(), "/tags/Ava%20Silva*s*Beatrice/works");
    }

    #[test]
    fn detail_url_asks_for_adult_view() {
        let u = detail_url(DEFAULT_BASE_URL, "24812345").unwrap();
        assert_eq!(u.as_str(), "https://archiveofourown.org/works/24812345?view_adult=true");
    }

    #[test]
    fn bad_base_is_an_error() {
        assert!(listing_url("not a url", "x", 1).is_err());
    }
}
