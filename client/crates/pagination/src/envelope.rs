//! Page envelope returned by list endpoints.

use serde::{Deserialize, Serialize};

use crate::request::PageRequest;

/// One page of items plus the totals needed to render pagination controls.
///
/// The serialized field names follow the record service's wire contract
/// (`content`, `pageNumber`, `pageSize`, `totalElements`, `totalPages`,
/// `first`, `last`). A page is always replaced wholesale; there is no API for
/// patching items in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(rename = "content", default = "Vec::new")]
    items: Vec<T>,
    #[serde(rename = "pageNumber")]
    page_index: u32,
    page_size: u32,
    #[serde(rename = "totalElements")]
    total_items: u64,
    total_pages: u32,
    #[serde(rename = "first")]
    is_first: bool,
    #[serde(rename = "last")]
    is_last: bool,
}

impl<T> Page<T> {
    /// Build a page for `request` from its items and the overall item count.
    ///
    /// Page totals and the first/last flags are derived from
    /// `total_items` and the request's page size.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let total_pages = u32::try_from(total_items.div_ceil(u64::from(request.size())))
            .unwrap_or(u32::MAX);
        let page_index = request.index();
        Self {
            items,
            page_index,
            page_size: request.size(),
            total_items,
            total_pages,
            is_first: page_index == 0,
            is_last: page_index.saturating_add(1) >= total_pages,
        }
    }

    /// Empty page answering `request`.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Items on this page, in service order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page and return its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Zero-based index of this page.
    #[must_use]
    pub const fn page_index(&self) -> u32 {
        self.page_index
    }

    /// Requested page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items across every page.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Number of pages available.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Whether this is the first page.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.is_first
    }

    /// Whether this is the last page.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.is_last
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The request addressing this page, when the reported size is usable.
    #[must_use]
    pub fn request(&self) -> Option<PageRequest> {
        PageRequest::new(self.page_index, self.page_size).ok()
    }

    /// Map every item while keeping the page metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            is_first: self.is_first,
            is_last: self.is_last,
        }
    }

    /// Fallible variant of [`Page::map`]; the first error aborts the mapping.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            page_index: self.page_index,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            is_first: self.is_first,
            is_last: self.is_last,
        })
    }
}
