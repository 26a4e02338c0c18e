//! Zero-based page requests and their query-string encoding.

use thiserror::Error;
use url::Url;

/// Page size used by list screens when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page size used when fetching a whole catalogue in one request.
pub const CATALOGUE_PAGE_SIZE: u32 = 100;

/// Largest page size accepted by [`PageRequest::new`].
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// Errors raised when building a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// The page size is zero or above [`MAX_PAGE_SIZE`].
    #[error("page size must be between 1 and {max}, got {size}")]
    InvalidSize {
        /// Requested page size.
        size: u32,
        /// Largest accepted page size.
        max: u32,
    },
}

/// Zero-based page address sent to list endpoints.
///
/// ## Invariants
/// - `size` is within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    index: u32,
    size: u32,
}

impl PageRequest {
    /// Build a request for page `index` holding up to `size` items.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::InvalidSize`] when `size` is zero or larger
    /// than [`MAX_PAGE_SIZE`].
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::new(2, 25).expect("valid request");
    /// assert_eq!(request.index(), 2);
    /// assert!(PageRequest::new(0, 0).is_err());
    /// ```
    pub const fn new(index: u32, size: u32) -> Result<Self, PageRequestError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PageRequestError::InvalidSize {
                size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { index, size })
    }

    /// Build a request for the first page.
    ///
    /// # Errors
    ///
    /// Same as [`PageRequest::new`].
    pub const fn first(size: u32) -> Result<Self, PageRequestError> {
        Self::new(0, size)
    }

    /// Request addressing the first page of the unfiltered catalogue.
    #[must_use]
    pub const fn catalogue() -> Self {
        Self {
            index: 0,
            size: CATALOGUE_PAGE_SIZE,
        }
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Same page size, different page index.
    #[must_use]
    pub const fn with_index(self, index: u32) -> Self {
        Self {
            index,
            size: self.size,
        }
    }

    /// Append `page` and `size` query parameters to `url`.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    /// use url::Url;
    ///
    /// let mut url = Url::parse("http://localhost/api/empresas").expect("valid url");
    /// PageRequest::new(3, 10).expect("valid").append_to(&mut url);
    /// assert_eq!(url.query(), Some("page=3&size=10"));
    /// ```
    pub fn append_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("page", &self.index.to_string())
            .append_pair("size", &self.size.to_string());
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            index: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page request construction.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero(0)]
    #[case::too_large(MAX_PAGE_SIZE + 1)]
    fn rejects_out_of_range_sizes(#[case] size: u32) {
        let error = PageRequest::new(0, size).expect_err("size must be rejected");
        assert_eq!(
            error,
            PageRequestError::InvalidSize {
                size,
                max: MAX_PAGE_SIZE
            }
        );
    }

    #[test]
    fn default_request_is_first_page_of_default_size() {
        let request = PageRequest::default();
        assert_eq!(request.index(), 0);
        assert_eq!(request.size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn with_index_keeps_size() {
        let request = PageRequest::catalogue().with_index(4);
        assert_eq!(request.index(), 4);
        assert_eq!(request.size(), CATALOGUE_PAGE_SIZE);
    }

    #[test]
    fn append_preserves_existing_query_pairs() {
        let mut url = Url::parse("http://localhost/api/empresas?search=acme").expect("valid url");
        PageRequest::default().append_to(&mut url);
        assert_eq!(url.query(), Some("search=acme&page=0&size=10"));
    }
}
