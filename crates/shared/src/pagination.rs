use std::num::NonZeroUsize;

use crate::models::Article;

/// Articles shown per page when none is configured
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(size) => size,
    None => panic!("page size must be non-zero"),
};

pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get())
}

/// Returns the 1-based page `page_index`. Requests past the end, or page 0,
/// give a short or empty slice.
pub fn page(articles: &[Article], page_index: usize, page_size: NonZeroUsize) -> &[Article] {
    if page_index == 0 {
        return &[];
    }

    let size = page_size.get();
    let start = (page_index - 1).saturating_mul(size).min(articles.len());
    let end = start.saturating_add(size).min(articles.len());
    &articles[start..end]
}

/// Current position within a fixed article list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    current: usize,
    total: usize,
    page_size: NonZeroUsize,
}

impl Paginator {
    pub fn new(len: usize, page_size: NonZeroUsize) -> Self {
        Self {
            current: 1,
            total: total_pages(len, page_size),
            page_size,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self) -> usize {
        self.total
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total
    }

    pub fn previous(&mut self) -> usize {
        if self.has_previous() {
            self.current -= 1;
        }
        self.current
    }

    pub fn next(&mut self) -> usize {
        if self.has_next() {
            self.current += 1;
        }
        self.current
    }

    /// Ordinal of the first article on the current page, for display
    pub fn first_ordinal(&self) -> usize {
        (self.current - 1) * self.page_size.get() + 1
    }

    pub fn slice<'a>(&self, articles: &'a [Article]) -> &'a [Article] {
        page(articles, self.current, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(n: usize) -> Vec<Article> {
        (1..=n)
            .map(|i| {
                Article::new(
                    format!("Title {}", i),
                    format!("Summary {}", i),
                    format!("https://example.com/{}", i),
                )
            })
            .collect()
    }

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, size(10)), 0);
        assert_eq!(total_pages(1, size(10)), 1);
        assert_eq!(total_pages(10, size(10)), 1);
        assert_eq!(total_pages(11, size(10)), 2);
        assert_eq!(total_pages(23, size(10)), 3);
    }

    #[test]
    fn test_twenty_three_articles_split_ten_ten_three() {
        let list = articles(23);
        assert_eq!(page(&list, 1, size(10)).len(), 10);
        assert_eq!(page(&list, 2, size(10)).len(), 10);
        assert_eq!(page(&list, 3, size(10)).len(), 3);
        assert_eq!(page(&list, 3, size(10))[0].title, "Title 21");
    }

    #[test]
    fn test_pages_partition_the_list() {
        for n in [0, 1, 7, 10, 23, 30] {
            for s in [1, 3, 10] {
                let list = articles(n);
                let rebuilt: Vec<Article> = (1..=total_pages(n, size(s)))
                    .flat_map(|i| page(&list, i, size(s)).to_vec())
                    .collect();
                assert_eq!(rebuilt, list, "n={} size={}", n, s);
            }
        }
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let list = articles(5);
        assert!(page(&list, 0, size(10)).is_empty());
        assert!(page(&list, 2, size(10)).is_empty());
        assert!(page(&list, usize::MAX, size(10)).is_empty());
    }

    #[test]
    fn test_previous_clamps_at_first_page() {
        let mut pager = Paginator::new(23, size(10));
        assert!(!pager.has_previous());
        assert_eq!(pager.previous(), 1);
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_next_clamps_at_last_page() {
        let mut pager = Paginator::new(23, size(10));
        assert_eq!(pager.next(), 2);
        assert_eq!(pager.next(), 3);
        assert!(!pager.has_next());
        assert_eq!(pager.next(), 3);
    }

    #[test]
    fn test_next_on_empty_list_stays_on_first_page() {
        let mut pager = Paginator::new(0, size(10));
        assert_eq!(pager.total_pages(), 0);
        assert_eq!(pager.next(), 1);
        assert!(pager.slice(&[]).is_empty());
    }

    #[test]
    fn test_first_ordinal_continues_across_pages() {
        let mut pager = Paginator::new(23, size(10));
        assert_eq!(pager.first_ordinal(), 1);
        pager.next();
        assert_eq!(pager.first_ordinal(), 11);
    }

    #[test]
    fn test_slice_follows_current_page() {
        let list = articles(12);
        let mut pager = Paginator::new(list.len(), size(5));
        pager.next();
        let titles: Vec<&str> = pager.slice(&list).iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["Title 6", "Title 7", "Title 8", "Title 9", "Title 10"]);
    }
}
