//! Offset pagination.
//!
//! The server offers no cursor. Windows are plain offset arithmetic over a
//! server-ordered collection, so a page can shift by a few items when the
//! collection changes between requests.

use serde::{Deserialize, Serialize};

/// A slice `[offset, offset + limit)` of a server-ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// Index of the first item (`first` query parameter).
    pub offset: u32,
    /// Maximum number of items (`max` query parameter).
    pub limit: u32,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

impl PageWindow {
    /// Creates a window.
    #[must_use]
    pub const fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    /// The window for a zero-based page number.
    #[must_use]
    pub const fn page(index: u32, size: u32) -> Self {
        Self::new(index.saturating_mul(size), size)
    }

    /// The following window of the same size.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::new(self.offset.saturating_add(self.limit), self.limit)
    }

    /// The preceding window, clamped at zero.
    #[must_use]
    pub const fn previous(self) -> Self {
        Self::new(self.offset.saturating_sub(self.limit), self.limit)
    }

    /// `first`/`max` query pairs.
    #[must_use]
    pub fn query(self) -> [(&'static str, String); 2] {
        [
            ("first", self.offset.to_string()),
            ("max", self.limit.to_string()),
        ]
    }

    /// Guesses whether more items follow a page of `returned` items.
    ///
    /// A full page means "probably". When the collection size is an exact
    /// multiple of the limit, the last full page still reports true and the
    /// following fetch comes back empty.
    #[must_use]
    pub const fn has_more(self, returned: usize) -> bool {
        self.limit > 0 && returned >= self.limit as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_arithmetic() {
        let window = PageWindow::page(2, 25);
        assert_eq!(window, PageWindow::new(50, 25));
        assert_eq!(window.next(), PageWindow::new(75, 25));
        assert_eq!(PageWindow::new(10, 25).previous(), PageWindow::new(0, 25));
    }

    #[test]
    fn full_page_reports_more() {
        let window = PageWindow::new(0, 10);
        assert!(window.has_more(10));
        assert!(!window.has_more(9));
        assert!(!window.has_more(0));
        assert!(!PageWindow::new(0, 0).has_more(0));
    }

    #[test]
    fn query_uses_first_and_max() {
        let query = PageWindow::new(40, 20).query();
        assert_eq!(query[0], ("first", "40".to_string()));
        assert_eq!(query[1], ("max", "20".to_string()));
    }
}
