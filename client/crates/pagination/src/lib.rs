//! Page request and page envelope primitives shared by registry list endpoints.
//!
//! Every list endpoint of the record service addresses pages with a
//! zero-based index and a page size, and answers with a [`Page`] envelope
//! carrying the total item and page counts alongside the items.
//!
//! # Example
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(1, 10).expect("valid request");
//! let page = Page::new(vec!["a", "b"], request, 12);
//!
//! assert_eq!(page.total_pages(), 2);
//! assert!(page.is_last());
//! assert!(!page.is_first());
//! ```

mod envelope;
mod request;

pub use envelope::Page;
pub use request::{
    CATALOGUE_PAGE_SIZE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, PageRequestError,
};
