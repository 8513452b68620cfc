use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 10;

/// Pagination position for one view: 1-based page plus page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl Cursor {
    /// A page size of zero makes no sense, so it becomes one
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// `ceil(total / per_page)`; zero when there is nothing to show
    pub fn total_pages(&self, total: u64) -> u32 {
        let per_page = u64::from(self.per_page.max(1));
        // Overflow-free ceil, `total` comes straight from the server
        let pages = total / per_page + u64::from(total % per_page != 0);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self, total: u64) -> bool {
        self.page < self.total_pages(total)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Advance one page if there is one. Returns whether the cursor moved.
    pub fn next(&mut self, total: u64) -> bool {
        if self.has_next(total) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Step back one page if not already on the first
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn set_per_page(&mut self, per_page: u32) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    /// Pull the page back onto the last page (or page 1 if empty)
    pub fn clamp(&mut self, total: u64) -> bool {
        let last = self.total_pages(total).max(1);
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }

    /// `items[(page-1)*per_page .. page*per_page]`, clipped to bounds
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let per_page = self.per_page.max(1) as usize;
        let start = (self.page.max(1) as usize - 1).saturating_mul(per_page);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(per_page).min(items.len());
        &items[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let cursor = Cursor::new(10);
        assert_eq!(cursor.total_pages(0), 0);
        assert_eq!(cursor.total_pages(1), 1);
        assert_eq!(cursor.total_pages(10), 1);
        assert_eq!(cursor.total_pages(25), 3);
    }

    #[test]
    fn test_total_pages_survives_huge_totals() {
        let cursor = Cursor::new(10);
        assert_eq!(cursor.total_pages(u64::MAX), u32::MAX);
        assert!(cursor.has_next(u64::MAX));
        assert_eq!(Cursor::new(1).total_pages(u64::from(u32::MAX)), u32::MAX);
    }

    #[test]
    fn test_has_next_on_each_page() {
        let mut cursor = Cursor::new(10);
        assert!(cursor.has_next(25));
        cursor.page = 2;
        assert!(cursor.has_next(25));
        cursor.page = 3;
        assert!(!cursor.has_next(25));
        assert!(!Cursor::new(10).has_next(0));
    }

    #[test]
    fn test_next_and_prev_respect_bounds() {
        let mut cursor = Cursor::new(10);
        assert!(!cursor.prev());
        assert!(cursor.next(15));
        assert_eq!(cursor.page, 2);
        assert!(!cursor.next(15));
        assert_eq!(cursor.page, 2);
        assert!(cursor.prev());
        assert_eq!(cursor.page, 1);
    }

    #[test]
    fn test_slice_matches_page_window() {
        let items: Vec<u32> = (0..25).collect();
        let mut cursor = Cursor::new(10);
        assert_eq!(cursor.slice(&items), &items[0..10]);
        cursor.page = 3;
        assert_eq!(cursor.slice(&items), &items[20..25]);
        cursor.page = 4;
        assert!(cursor.slice(&items).is_empty());
    }

    #[test]
    fn test_clamp_to_last_page_or_first() {
        let mut cursor = Cursor::new(10);
        cursor.page = 3;
        assert!(cursor.clamp(5));
        assert_eq!(cursor.page, 1);

        cursor.page = 3;
        assert!(cursor.clamp(0));
        assert_eq!(cursor.page, 1);

        cursor.page = 2;
        assert!(!cursor.clamp(20));
        assert_eq!(cursor.page, 2);
    }

    #[test]
    fn test_zero_page_size_is_coerced() {
        let mut cursor = Cursor::new(0);
        assert_eq!(cursor.per_page, 1);
        cursor.page = 4;
        cursor.set_per_page(0);
        assert_eq!(cursor.per_page, 1);
        assert_eq!(cursor.page, 1);
    }
}
