//! Outbound adapters implementing domain ports over HTTP.
//!
//! - **postal**: primary and fallback postal code lookups
//! - **records**: the organization and counterparty record service
//!
//! Adapters are thin translators between wire DTOs and domain types. They
//! contain no business logic.

mod http;
pub mod postal;
pub mod records;

pub use http::HttpIdentity;
