//! Filter and pagination state owned by the catalog engine.

use serde::{Deserialize, Serialize};
use shared::domain::{CategoryId, SortKey};

pub const DEFAULT_PAGE_SIZE: u32 = 15;
pub const DEFAULT_VISIBLE_PAGES: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort: SortKey,
}

impl FilterState {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(CategoryId::new(category));
        self
    }

    pub fn with_price_range(mut self, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Search text with surrounding whitespace removed; `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category
            .as_ref()
            .map(|category| category.as_str().trim())
            .filter(|id| !id.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.search_term().is_none()
            && self.category_id().is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.sort == SortKey::None
    }

    /// One line per active filter, for a "results for ..." banner.
    pub fn describe(&self, category_name: Option<&str>) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(term) = self.search_term() {
            lines.push(format!("Search: \"{term}\""));
        }
        if let Some(id) = self.category_id() {
            lines.push(format!("Category: {}", category_name.unwrap_or(id)));
        }
        let mut price = Vec::new();
        if let Some(min) = self.min_price {
            price.push(format!("From ${min}"));
        }
        if let Some(max) = self.max_price {
            price.push(format!("To ${max}"));
        }
        if !price.is_empty() {
            lines.push(format!("Price: {}", price.join(" ")));
        }
        if self.sort != SortKey::None {
            lines.push(format!("Sorted by: {}", self.sort.label()));
        }
        lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_pages: 1,
            total_count: 0,
            has_next: false,
            has_previous: false,
        }
    }
}

/// An entry in a rendered page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page { number: u32, current: bool },
    Ellipsis,
}

impl PaginationState {
    /// Page and size as sent on the wire: zero page becomes 1, zero size the default.
    pub fn request(&self) -> (u32, u32) {
        let page = self.current_page.max(1);
        let page_size = if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        };
        (page, page_size)
    }

    pub fn contains_page(&self, page: i64) -> bool {
        page >= 1 && page <= i64::from(self.total_pages.max(1))
    }

    pub fn should_show_controls(&self) -> bool {
        self.total_pages > 1
    }

    /// 1-based indices of the first and last item on the current page.
    pub fn item_range(&self) -> Option<(u64, u64)> {
        if self.total_count == 0 {
            return None;
        }
        let (page, page_size) = self.request();
        let first = u64::from(page - 1) * u64::from(page_size) + 1;
        if first > self.total_count {
            return None;
        }
        let last = (u64::from(page) * u64::from(page_size)).min(self.total_count);
        Some((first, last))
    }

    /// Page selector with at most `max_visible` numbered pages around the
    /// current one; first and last pages stay reachable behind ellipses.
    pub fn page_window(&self, max_visible: u32) -> Vec<PageLink> {
        let total = self.total_pages.max(1);
        let current = self.current_page.clamp(1, total);
        let max_visible = max_visible.max(1);

        let mut start = current.saturating_sub(max_visible / 2).max(1);
        let end = (start + max_visible - 1).min(total);
        if end - start + 1 < max_visible {
            start = end.saturating_sub(max_visible - 1).max(1);
        }

        let page = |number: u32| PageLink::Page {
            number,
            current: number == current,
        };
        let mut links = Vec::new();
        if start > 1 {
            links.push(page(1));
            if start > 2 {
                links.push(PageLink::Ellipsis);
            }
        }
        links.extend((start..=end).map(page));
        if end < total {
            if end < total - 1 {
                links.push(PageLink::Ellipsis);
            }
            links.push(page(total));
        }
        links
    }
}

/// Filters, pagination, and the request sequence behind the catalog view.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub filters: FilterState,
    pub pagination: PaginationState,
    pub(crate) issued_tickets: u64,
}

impl CatalogState {
    pub(crate) fn issue_ticket(&mut self) -> u64 {
        self.issued_tickets += 1;
        self.issued_tickets
    }

    pub(crate) fn latest_ticket(&self) -> u64 {
        self.issued_tickets
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
