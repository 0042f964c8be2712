use anyhow::{bail, Result};
use serde::Serialize;

pub const DEFAULT_PAGE_COUNT: u32 = 30;

/// Inclusive page range; walks downward when `end < start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start == 0 || end == 0 { bail!("pages are numbered from 1 (got start={} end={})", start, end); }
        Ok(Self { start, end })
    }

    /// `--end` wins; otherwise `--pages` counts forward from `start`.
    pub fn from_args(start: u32, end: Option<u32>, pages: Option<u32>) -> Result<Self> {
        match (end, pages) {
            (Some(end), _) => Self::new(start, end),
            (None, Some(0)) => bail!("--pages must be at least 1"),
            (None, count) => {
                let count = count.unwrap_or(DEFAULT_PAGE_COUNT);
                let end = start.checked_add(count - 1).ok_or_else(|| anyhow::anyhow!("page range overflows"))?;
                Self::new(start, end)
            }
        }
    }

    pub fn descending(&self) -> bool { self.end < self.start }

    pub fn page_count(&self) -> u32 { self.start.abs_diff(self.end) + 1 }

    /// The page after `page`, or `None` once `end` has been visited.
    pub fn next(&self, page: u32) -> Option<u32> {
        if page == self.end { return None; }
        if self.descending() { page.checked_sub(1).filter(|p| *p >= self.end) } else { page.checked_add(1).filter(|p| *p <= self.end) }
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::successors(Some(self.start), move |p| self.next(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_range() {
        let r = PageRange::new(2, 5).unwrap();
        assert_eq!(r.pages().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        assert_eq!(r.page_count(), 4);
    }

    #[test]
    fn descending_range() {
        let r = PageRange::new(5, 3).unwrap();
        assert!(r.descending());
        assert_eq!(r.pages().collect::<Vec<_>>(), vec![5, 4, 3]);
    }

    #[test]
    fn single_page() {
        let r = PageRange::new(7, 7).unwrap();
        assert_eq!(r.pages().collect::<Vec<_>>(), vec![7]);
        assert_eq!(r.next(7), None);
    }

    #[test]
    fn page_count_form() {
        assert_eq!(PageRange::from_args(1, None, Some(30)).unwrap(), PageRange { start: 1, end: 30 });
        assert_eq!(PageRange::from_args(4, None, None).unwrap().page_count(), DEFAULT_PAGE_COUNT);
        assert_eq!(PageRange::from_args(4, Some(2), Some(9)).unwrap(), PageRange { start: 4, end: 2 });
        assert!(PageRange::from_args(1, None, Some(0)).is_err());
        assert!(PageRange::new(0, 3).is_err());
    }
}
