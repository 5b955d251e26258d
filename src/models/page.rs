use serde::{Deserialize, Serialize};

use super::query::PAGE_SIZE_OPTIONS;

/// Paginated list result as returned by the backend's `_query` endpoints.
/// `total` is authoritative; only display values are derived here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page_index: u32,
    #[serde(default)]
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn empty(page_size: u32) -> Self {
        Page { data: vec![], total: 0, page_index: 0, page_size }
    }

    /// 1-based page number for display.
    pub fn current(&self) -> u32 {
        self.page_index + 1
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn has_prev(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.current()) < self.total_pages()
    }

    pub fn summary(&self) -> String {
        format!("Total {} records, page {}/{}", self.total, self.current(), self.total_pages())
    }
}

/// One entry of the pager, with a ready-made href.
#[derive(Debug, Clone)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// Page-size choice for the size selector.
#[derive(Debug, Clone)]
pub struct SizeOption {
    pub size: u32,
    pub href: String,
    pub selected: bool,
}

/// Build pager links around the current page. `href` maps a
/// (1-based page, page size) pair to a URL.
pub fn page_links<T>(page: &Page<T>, href: impl Fn(u32, u32) -> String) -> Vec<PageLink> {
    const WINDOW: u64 = 2;
    let pages = page.total_pages();
    let current = u64::from(page.current());
    let first = current.saturating_sub(WINDOW).max(1);
    let last = (current + WINDOW).min(pages);
    (first..=last)
        .map(|n| {
            let n = n as u32;
            PageLink { number: n, href: href(n, page.page_size), current: u64::from(n) == current }
        })
        .collect()
}

pub fn size_options<T>(page: &Page<T>, href: impl Fn(u32, u32) -> String) -> Vec<SizeOption> {
    PAGE_SIZE_OPTIONS
        .iter()
        .map(|&size| SizeOption { size, href: href(1, size), selected: size == page.page_size })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64, page_index: u32, page_size: u32) -> Page<()> {
        Page { data: vec![], total, page_index, page_size }
    }

    #[test]
    fn summary_rounds_pages_up() {
        let p = page(21, 1, 10);
        assert_eq!(p.total_pages(), 3);
        assert_eq!(p.summary(), "Total 21 records, page 2/3");
    }

    #[test]
    fn zero_page_size_has_no_pages() {
        assert_eq!(page(5, 0, 0).total_pages(), 0);
    }

    #[test]
    fn prev_next_flags() {
        let p = page(30, 0, 10);
        assert!(!p.has_prev());
        assert!(p.has_next());
        let p = page(30, 2, 10);
        assert!(p.has_prev());
        assert!(!p.has_next());
    }

    #[test]
    fn links_window_around_current() {
        let p = page(100, 4, 10);
        let links = page_links(&p, |n, s| format!("?page={n}&size={s}"));
        let numbers: Vec<u32> = links.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![3, 4, 5, 6, 7]);
        assert!(links.iter().find(|l| l.current).is_some_and(|l| l.number == 5));
        assert_eq!(links[0].href, "?page=3&size=10");
    }

    #[test]
    fn deserializes_backend_shape() {
        let json = r#"{"data":[1,2],"total":12,"pageIndex":1,"pageSize":2}"#;
        let p: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(p.data, vec![1, 2]);
        assert_eq!(p.current(), 2);
        assert_eq!(p.total_pages(), 6);
    }
}
