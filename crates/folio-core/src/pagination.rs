//! Page-number pagination.
//!
//! Out-of-range requests never fail: a page that does not parse yields the
//! first page, and a page outside `1..=num_pages` yields the last one.

use serde::Serialize;

/// Posts per listing page.
pub const DEFAULT_PER_PAGE: u64 = 6;

/// A requested page, not yet resolved against a collection size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// `None` when the raw value did not parse as an integer.
    pub number: Option<i64>,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(number: i64, per_page: u64) -> Self {
        Self {
            number: Some(number),
            per_page: per_page.max(1),
        }
    }

    /// Parse a raw `?page=` value. Missing values mean page 1.
    pub fn parse(raw: Option<&str>, per_page: u64) -> Self {
        let number = match raw.map(str::trim) {
            None | Some("") => Some(1),
            Some(s) => s.parse::<i64>().ok(),
        };
        Self {
            number,
            per_page: per_page.max(1),
        }
    }

    pub fn first() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }

    /// Resolve against `total` items.
    pub fn resolve(&self, total: u64) -> PageWindow {
        let num_pages = total.div_ceil(self.per_page).max(1);
        let number = match self.number {
            None => 1,
            Some(n) if n < 1 || n as u64 > num_pages => num_pages,
            Some(n) => n as u64,
        };

        PageWindow {
            number,
            num_pages,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// A concrete slice of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn into_page<T>(self, items: Vec<T>, total: u64) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}
