//! Record-management client for organizations and counterparties.
//!
//! The domain core resolves postal codes into addresses, drives debounced
//! list queries, and keeps organization/counterparty associations consistent.
//! Outbound adapters talk to the record service over HTTP; the inbound CLI
//! adapter exposes the operations from the command line.

pub mod config;
pub mod context;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::ClientSettings;
pub use context::{ClientContext, ContextError};
